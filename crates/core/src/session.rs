//! Journal records ("sessions"), one variant per action type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ActionId;

/// Generates an opaque unique record id.
#[must_use]
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Knowledge archive entry (`action-1`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub topic: String,
    pub core_question: String,
    #[serde(default)]
    pub notes: String,
}

/// Household observation log entry (`action-2`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub observation: String,
    pub analysis: String,
}

/// Problem reframing entry (`action-3`).
///
/// The three-reframe minimum is a capture-time rule; stored records may carry fewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReframeRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub problem: String,
    #[serde(default)]
    pub reframes: Vec<String>,
}

/// Weight tracking entry (`action-4`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A persisted journal record, discriminated by `actionId` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "actionId")]
pub enum Session {
    #[serde(rename = "action-1")]
    Knowledge(KnowledgeRecord),
    #[serde(rename = "action-2")]
    Household(HouseholdRecord),
    #[serde(rename = "action-3")]
    Reframe(ReframeRecord),
    #[serde(rename = "action-4")]
    Weight(WeightRecord),
}

impl Session {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Knowledge(r) => &r.id,
            Self::Household(r) => &r.id,
            Self::Reframe(r) => &r.id,
            Self::Weight(r) => &r.id,
        }
    }

    #[must_use]
    pub const fn action_id(&self) -> ActionId {
        match self {
            Self::Knowledge(_) => ActionId::Knowledge,
            Self::Household(_) => ActionId::Household,
            Self::Reframe(_) => ActionId::Reframe,
            Self::Weight(_) => ActionId::Weight,
        }
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Knowledge(r) => r.created_at,
            Self::Household(r) => r.created_at,
            Self::Reframe(r) => r.created_at,
            Self::Weight(r) => r.created_at,
        }
    }

    /// Merges `patch` into this record. Fields the variant does not carry are ignored.
    pub fn apply_patch(&mut self, patch: &SessionPatch) {
        match self {
            Self::Knowledge(r) => {
                if let Some(v) = &patch.topic {
                    r.topic.clone_from(v);
                }
                if let Some(v) = &patch.core_question {
                    r.core_question.clone_from(v);
                }
                if let Some(v) = &patch.notes {
                    r.notes.clone_from(v);
                }
            },
            Self::Household(r) => {
                if let Some(v) = &patch.observation {
                    r.observation.clone_from(v);
                }
                if let Some(v) = &patch.analysis {
                    r.analysis.clone_from(v);
                }
            },
            Self::Reframe(r) => {
                if let Some(v) = &patch.problem {
                    r.problem.clone_from(v);
                }
                if let Some(v) = &patch.reframes {
                    r.reframes.clone_from(v);
                }
            },
            Self::Weight(r) => {
                if let Some(v) = patch.date {
                    r.date = v;
                }
                if let Some(v) = patch.weight_kg {
                    r.weight_kg = v;
                }
                if let Some(v) = &patch.note {
                    r.note = if v.trim().is_empty() { None } else { Some(v.clone()) };
                }
            },
        }
    }
}

/// Partial update for [`Session::apply_patch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionPatch {
    pub topic: Option<String>,
    pub core_question: Option<String>,
    pub notes: Option<String>,
    pub observation: Option<String>,
    pub analysis: Option<String>,
    pub problem: Option<String>,
    pub reframes: Option<Vec<String>>,
    pub date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub note: Option<String>,
}

impl SessionPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
