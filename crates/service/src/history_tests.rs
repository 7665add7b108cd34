use std::sync::Arc;

use actionlog_core::{ActionId, KnowledgeRecord, ReframeRecord, Session, WeightRecord};
use actionlog_storage::{MemoryKv, RecordStore};
use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use crate::error::ServiceError;
use crate::history_service::{HistoryFilter, HistoryService, summary_line};

fn service() -> HistoryService<Arc<MemoryKv>> {
    HistoryService::new(RecordStore::new(Arc::new(MemoryKv::new())))
}

fn knowledge(id: &str, topic: &str) -> Session {
    Session::Knowledge(KnowledgeRecord {
        id: id.to_owned(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        topic: topic.to_owned(),
        core_question: "Why?".to_owned(),
        notes: "some notes".to_owned(),
    })
}

fn reframe(id: &str) -> Session {
    Session::Reframe(ReframeRecord {
        id: id.to_owned(),
        created_at: Utc::now(),
        problem: "Commute".to_owned(),
        reframes: vec!["podcast time".to_owned(), "walk".to_owned()],
    })
}

fn seed(service: &HistoryService<Arc<MemoryKv>>, sessions: Vec<Session>) {
    let text = serde_json::to_string(&serde_json::json!({ "sessions": sessions })).unwrap();
    service.import_str(&text).unwrap();
}

#[test]
fn filter_by_action() {
    let service = service();
    seed(&service, vec![knowledge("k1", "Rust"), reframe("r1"), knowledge("k2", "Go")]);

    assert_eq!(service.filtered(HistoryFilter::All).unwrap().len(), 3);
    let only = service.filtered(HistoryFilter::Action(ActionId::Knowledge)).unwrap();
    assert_eq!(only.iter().map(Session::id).collect::<Vec<_>>(), ["k1", "k2"]);
    assert_eq!(HistoryFilter::from(None), HistoryFilter::All);
}

#[test]
fn delete_requires_confirmation() {
    let service = service();
    seed(&service, vec![knowledge("k1", "Rust")]);

    assert!(matches!(service.delete("k1", false), Err(ServiceError::InvalidInput(_))));
    assert!(service.get("k1").is_ok());

    service.delete("k1", true).unwrap();
    assert!(service.get("k1").unwrap_err().is_not_found());
    assert!(service.delete("k1", true).unwrap_err().is_not_found());
}

#[test]
fn clear_requires_confirmation() {
    let service = service();
    seed(&service, vec![knowledge("k1", "Rust")]);
    assert!(service.clear(false).is_err());
    assert_eq!(service.filtered(HistoryFilter::All).unwrap().len(), 1);
    service.clear(true).unwrap();
    assert!(service.filtered(HistoryFilter::All).unwrap().is_empty());
}

#[test]
fn export_then_import_through_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.json");
    let source = service();
    seed(&source, vec![knowledge("k1", "Rust"), reframe("r1")]);
    source.export_to(&path).unwrap();

    let target = service();
    assert_eq!(target.import_from(&path).unwrap(), 2);
    assert_eq!(
        target.filtered(HistoryFilter::All).unwrap(),
        source.filtered(HistoryFilter::All).unwrap()
    );
}

#[test]
fn malformed_import_keeps_existing_records() {
    let service = service();
    seed(&service, vec![knowledge("k1", "Rust")]);

    let err = service.import_str(r#"{"not_sessions": []}"#).unwrap_err();
    assert!(err.is_malformed_import());
    assert_eq!(service.filtered(HistoryFilter::All).unwrap().len(), 1);
}

#[test]
fn import_of_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = service().import_from(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ServiceError::Io(_)));
}

#[test]
fn compose_references_follows_requested_order() {
    let service = service();
    seed(&service, vec![knowledge("k1", "Rust"), reframe("r1")]);

    let text = service.compose_references(&["r1".to_owned(), "k1".to_owned()]).unwrap();
    assert_eq!(
        text,
        "- [A3] Commute\n  - podcast time\n  - walk\n- [A1] Rust: Why?\n  some notes\n"
    );
    assert!(service.compose_references(&["nope".to_owned()]).is_err());
}

#[test]
fn describe_and_summary() {
    let service = service();
    let weight = Session::Weight(WeightRecord {
        id: "w1".to_owned(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        weight_kg: 72.4,
        note: None,
    });
    seed(&service, vec![knowledge("k1", "Rust"), weight.clone()]);

    assert!(service.describe("k1").unwrap().contains("Topic: Rust"));
    assert_eq!(summary_line(&weight), "w1  [A4] 2024-05-01 08:30  2024-05-01 72.4kg");
}
