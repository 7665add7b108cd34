//! Action type tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One of the four fixed journaling/tracking flows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionId {
    /// Knowledge archive: topic, core question, notes.
    #[serde(rename = "action-1")]
    Knowledge,
    /// Household operations log: observation and pattern analysis.
    #[serde(rename = "action-2")]
    Household,
    /// Problem reframing: one problem, several reframes.
    #[serde(rename = "action-3")]
    Reframe,
    /// Weight tracking.
    #[serde(rename = "action-4")]
    Weight,
}

impl ActionId {
    pub const ALL: &'static [ActionId] =
        &[ActionId::Knowledge, ActionId::Household, ActionId::Reframe, ActionId::Weight];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Knowledge => "action-1",
            Self::Household => "action-2",
            Self::Reframe => "action-3",
            Self::Weight => "action-4",
        }
    }

    /// Short tag used in composed references (`A1`..`A4`).
    #[must_use]
    pub const fn short_tag(&self) -> &'static str {
        match *self {
            Self::Knowledge => "A1",
            Self::Household => "A2",
            Self::Reframe => "A3",
            Self::Weight => "A4",
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match *self {
            Self::Knowledge => "Knowledge archive",
            Self::Household => "Household log",
            Self::Reframe => "Problem reframing",
            Self::Weight => "Weight log",
        }
    }

    /// Whether the conversational capture flow has a schema for this action.
    #[must_use]
    pub const fn supports_capture(&self) -> bool {
        !matches!(self, Self::Weight)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "action-1" | "1" | "knowledge" => Ok(Self::Knowledge),
            "action-2" | "2" | "household" => Ok(Self::Household),
            "action-3" | "3" | "reframe" => Ok(Self::Reframe),
            "action-4" | "4" | "weight" => Ok(Self::Weight),
            other => Err(CoreError::UnknownAction(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_and_aliases() {
        assert_eq!("action-1".parse::<ActionId>().unwrap(), ActionId::Knowledge);
        assert_eq!("3".parse::<ActionId>().unwrap(), ActionId::Reframe);
        assert_eq!("Weight".parse::<ActionId>().unwrap(), ActionId::Weight);
        assert!("action-9".parse::<ActionId>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_tags() {
        let json = serde_json::to_string(&ActionId::Household).unwrap();
        assert_eq!(json, "\"action-2\"");
        let back: ActionId = serde_json::from_str("\"action-4\"").unwrap();
        assert_eq!(back, ActionId::Weight);
    }

    #[test]
    fn test_capture_support() {
        assert!(ActionId::Knowledge.supports_capture());
        assert!(ActionId::Reframe.supports_capture());
        assert!(!ActionId::Weight.supports_capture());
    }
}
