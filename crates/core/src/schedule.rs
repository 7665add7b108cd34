//! Reminder schedule types and fire-time arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// How a reminder repeats after it fires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    /// Next occurrence of a wall-clock time, fires once.
    Once,
    /// Wall-clock time, re-armed one day later after every fire.
    Daily,
    /// Explicit date and time, fires once.
    Date,
}

impl Recurrence {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Date => "date",
        }
    }

    #[must_use]
    pub const fn repeats(&self) -> bool {
        matches!(self, Self::Daily)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "date" => Ok(Self::Date),
            _ => Err(CoreError::InvalidInput(format!("Invalid recurrence: {s}"))),
        }
    }
}

/// A persisted reminder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItem {
    pub id: String,
    /// Next fire time.
    pub when: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Handle into the platform alarm registry while armed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_id: Option<i32>,
}

impl ScheduledItem {
    /// Whether the item still has a fire time ahead of `now`.
    #[must_use]
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.when > now
    }
}

/// When a reminder should fire, in wall-clock terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireSpec {
    Once(NaiveTime),
    Daily(NaiveTime),
    Date(NaiveDateTime),
}

impl FireSpec {
    #[must_use]
    pub const fn recurrence(&self) -> Recurrence {
        match self {
            Self::Once(_) => Recurrence::Once,
            Self::Daily(_) => Recurrence::Daily,
            Self::Date(_) => Recurrence::Date,
        }
    }

    /// Computes the first fire time strictly after `now`.
    ///
    /// Wall times are interpreted in `offset`. `Once` and `Daily` roll over to
    /// the next day when today's time has passed; `Date` must lie in the future.
    pub fn first_fire(&self, now: DateTime<Utc>, offset: FixedOffset) -> Result<DateTime<Utc>> {
        match *self {
            Self::Once(time) | Self::Daily(time) => {
                let local_now = now.with_timezone(&offset);
                let today = local_now.date_naive().and_time(time);
                let mut target = to_utc(today, offset)?;
                if target <= now {
                    let tomorrow = today.checked_add_days(Days::new(1)).ok_or_else(|| {
                        CoreError::InvalidInput("reminder time out of range".to_owned())
                    })?;
                    target = to_utc(tomorrow, offset)?;
                }
                Ok(target)
            },
            Self::Date(at) => {
                let target = to_utc(at, offset)?;
                if target <= now {
                    return Err(CoreError::InvalidInput(format!(
                        "reminder date {at} is not in the future"
                    )));
                }
                Ok(target)
            },
        }
    }
}

fn to_utc(at: NaiveDateTime, offset: FixedOffset) -> Result<DateTime<Utc>> {
    offset
        .from_local_datetime(&at)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CoreError::InvalidInput(format!("ambiguous local time {at}")))
}
