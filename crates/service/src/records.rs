//! Mapping between loose JSON payloads, typed records, and model replies.

use actionlog_core::{
    ActionId, HouseholdRecord, KnowledgeRecord, ReframeRecord, Session, SessionPatch,
    WeightRecord, generate_id,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::capture::{has_text, text_of, validate};
use crate::error::ServiceError;

/// Builds a typed record from a capture or form payload.
///
/// The payload is validated first; every issue is reported together.
pub fn session_from_payload(
    action: ActionId,
    payload: &Value,
    now: DateTime<Utc>,
) -> Result<Session, ServiceError> {
    let issues = validate(action, payload);
    if !issues.is_empty() {
        return Err(ServiceError::InvalidInput(issues.join("; ")));
    }
    let id = generate_id();
    let field = |key: &str| text_of(payload.get(key));
    Ok(match action {
        ActionId::Knowledge => Session::Knowledge(KnowledgeRecord {
            id,
            created_at: now,
            topic: field("topic"),
            core_question: field("coreQuestion"),
            notes: field("notes"),
        }),
        ActionId::Household => Session::Household(HouseholdRecord {
            id,
            created_at: now,
            observation: field("observation"),
            analysis: field("analysis"),
        }),
        ActionId::Reframe => Session::Reframe(ReframeRecord {
            id,
            created_at: now,
            problem: field("problem"),
            reframes: payload
                .get("reframes")
                .and_then(Value::as_array)
                .map(|items| {
                    items.iter().filter(|r| has_text(r)).map(|r| text_of(Some(r))).collect()
                })
                .unwrap_or_default(),
        }),
        ActionId::Weight => {
            let date = NaiveDate::parse_from_str(&field("date"), "%Y-%m-%d")
                .map_err(|e| ServiceError::InvalidInput(format!("date: {e}")))?;
            let weight_kg = payload
                .get("weightKg")
                .and_then(Value::as_f64)
                .ok_or_else(|| ServiceError::InvalidInput("weightKg is required".to_owned()))?;
            let note = field("note");
            Session::Weight(WeightRecord {
                id,
                created_at: now,
                date,
                weight_kg,
                note: (!note.is_empty()).then_some(note),
            })
        },
    })
}

/// Maps a refinement reply onto the record's free-text field.
///
/// Reframe replies are split into one reframe per line, `;`, or bullet.
#[must_use]
pub fn refinement_patch(session: &Session, reply: &str) -> SessionPatch {
    let reply = reply.trim().to_owned();
    match session.action_id() {
        ActionId::Knowledge => SessionPatch { notes: Some(reply), ..SessionPatch::default() },
        ActionId::Household => SessionPatch { analysis: Some(reply), ..SessionPatch::default() },
        ActionId::Reframe => SessionPatch {
            reframes: Some(
                reply
                    .split(['\n', ';', '•'])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect(),
            ),
            ..SessionPatch::default()
        },
        ActionId::Weight => SessionPatch { note: Some(reply), ..SessionPatch::default() },
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn knowledge_payload_becomes_record() {
        let session = session_from_payload(
            ActionId::Knowledge,
            &json!({"topic": " T ", "coreQuestion": "Q"}),
            now(),
        )
        .unwrap();
        let Session::Knowledge(record) = session else { panic!("wrong variant") };
        assert_eq!(record.topic, "T");
        assert_eq!(record.core_question, "Q");
        assert_eq!(record.notes, "");
        assert_eq!(record.created_at, now());
        assert!(!record.id.is_empty());
    }

    #[test]
    fn invalid_payload_lists_all_issues() {
        let err = session_from_payload(ActionId::Household, &json!({}), now()).unwrap_err();
        let ServiceError::InvalidInput(msg) = err else { panic!("wrong error") };
        assert_eq!(msg, "observation is required; analysis is required");
    }

    #[test]
    fn weight_payload_parses_date_and_note() {
        let session = session_from_payload(
            ActionId::Weight,
            &json!({"date": "2024-05-01", "weightKg": 72.4, "note": "  "}),
            now(),
        )
        .unwrap();
        let Session::Weight(record) = session else { panic!("wrong variant") };
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!((record.weight_kg - 72.4).abs() < f64::EPSILON);
        assert_eq!(record.note, None);
    }

    #[test]
    fn reframe_reply_splits_on_separators() {
        let session = session_from_payload(
            ActionId::Reframe,
            &json!({"problem": "p", "reframes": ["a", "b", "c"]}),
            now(),
        )
        .unwrap();
        let patch = refinement_patch(&session, "• first\nsecond; third\n\n");
        assert_eq!(
            patch.reframes.unwrap(),
            vec!["first".to_owned(), "second".to_owned(), "third".to_owned()]
        );
    }

    #[test]
    fn household_reply_targets_analysis() {
        let session = session_from_payload(
            ActionId::Household,
            &json!({"observation": "o", "analysis": "a"}),
            now(),
        )
        .unwrap();
        let patch = refinement_patch(&session, " sharper analysis ");
        assert_eq!(patch.analysis.as_deref(), Some("sharper analysis"));
        assert!(patch.notes.is_none());
    }
}
