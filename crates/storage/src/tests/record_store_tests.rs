use super::{create_memory_store, household, knowledge, reframe, weight};
use crate::StorageError;
use actionlog_core::{ActionId, Session, SessionPatch};

#[test]
fn test_add_prepends_most_recent_first() {
    let store = create_memory_store();
    let first = knowledge("first");
    let second = household("second");
    store.add(first.clone()).unwrap();
    store.add(second.clone()).unwrap();

    let all = store.list(None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], second);
    assert_eq!(all[1], first);
}

#[test]
fn test_add_rejects_duplicate_id() {
    let store = create_memory_store();
    let session = knowledge("dup");
    store.add(session.clone()).unwrap();
    let err = store.add(session).unwrap_err();
    assert!(matches!(err, StorageError::Duplicate(_)));
    assert_eq!(store.list(None).unwrap().len(), 1);
}

#[test]
fn test_list_filters_by_action() {
    let store = create_memory_store();
    store.add(knowledge("a")).unwrap();
    store.add(weight("2025-01-01", 71.0)).unwrap();
    store.add(knowledge("b")).unwrap();

    let knowledge_only = store.list(Some(ActionId::Knowledge)).unwrap();
    assert_eq!(knowledge_only.len(), 2);
    assert!(knowledge_only.iter().all(|s| s.action_id() == ActionId::Knowledge));
    assert!(store.list(Some(ActionId::Reframe)).unwrap().is_empty());
}

#[test]
fn test_update_missing_id_is_noop() {
    let store = create_memory_store();
    store.add(knowledge("keep")).unwrap();
    let before = store.export_all().unwrap();

    let patch = SessionPatch { notes: Some("changed".to_owned()), ..SessionPatch::default() };
    assert!(!store.update_by_id("no-such-id", &patch).unwrap());
    assert_eq!(store.export_all().unwrap(), before);
}

#[test]
fn test_update_merges_patch() {
    let store = create_memory_store();
    let session = weight("2025-01-02", 70.5);
    let id = session.id().to_owned();
    store.add(session).unwrap();

    let patch = SessionPatch { weight_kg: Some(69.9), note: Some("fasted".to_owned()), ..SessionPatch::default() };
    assert!(store.update_by_id(&id, &patch).unwrap());

    let Some(Session::Weight(updated)) = store.get_by_id(&id).unwrap() else {
        panic!("weight entry missing");
    };
    assert!((updated.weight_kg - 69.9).abs() < f64::EPSILON);
    assert_eq!(updated.note.as_deref(), Some("fasted"));
}

#[test]
fn test_delete_then_get_is_not_found() {
    let store = create_memory_store();
    let session = reframe("p", &["a", "b", "c"]);
    let id = session.id().to_owned();
    store.add(session).unwrap();

    assert!(store.delete_by_id(&id).unwrap());
    assert!(store.get_by_id(&id).unwrap().is_none());
    assert!(!store.delete_by_id(&id).unwrap());
}

#[test]
fn test_export_import_round_trip() {
    let store = create_memory_store();
    store.add(knowledge("k")).unwrap();
    store.add(household("h")).unwrap();
    store.add(reframe("p", &["a", "b"])).unwrap();
    store.add(weight("2025-02-01", 80.25)).unwrap();
    let original = store.list(None).unwrap();
    let exported = store.export_all().unwrap();

    let other = create_memory_store();
    let imported = other.import_all(&exported).unwrap();
    assert_eq!(imported, 4);
    assert_eq!(other.list(None).unwrap(), original);
}

#[test]
fn test_export_is_pretty_sessions_object() {
    let store = create_memory_store();
    store.add(knowledge("k")).unwrap();
    let exported = store.export_all().unwrap();
    assert!(exported.starts_with("{\n  \"sessions\": ["));
}

#[test]
fn test_import_without_sessions_field_fails_and_keeps_data() {
    let store = create_memory_store();
    store.add(knowledge("keep me")).unwrap();
    let before = store.list(None).unwrap();

    let err = store.import_all(r#"{"not_sessions": []}"#).unwrap_err();
    assert!(err.is_malformed_import());
    assert_eq!(store.list(None).unwrap(), before);

    assert!(store.import_all("not json at all").unwrap_err().is_malformed_import());
    assert!(store.import_all(r#"{"sessions": {}}"#).unwrap_err().is_malformed_import());
    assert_eq!(store.list(None).unwrap(), before);
}

#[test]
fn test_import_drops_falsy_and_undecodable_entries() {
    let store = create_memory_store();
    let payload = r#"{"sessions": [
        null,
        false,
        0,
        "",
        {"id":"x1","actionId":"action-2","createdAt":"2025-01-01T00:00:00Z","observation":"o","analysis":"a"},
        {"id":"x2","actionId":"action-9","createdAt":"2025-01-01T00:00:00Z"}
    ]}"#;
    assert_eq!(store.import_all(payload).unwrap(), 1);
    assert_eq!(store.list(None).unwrap()[0].id(), "x1");
}

#[test]
fn test_import_replaces_existing_collection() {
    let store = create_memory_store();
    store.add(knowledge("old")).unwrap();
    assert_eq!(store.import_all(r#"{"sessions": []}"#).unwrap(), 0);
    assert!(store.list(None).unwrap().is_empty());
}

#[test]
fn test_clear_all() {
    let store = create_memory_store();
    store.add(knowledge("a")).unwrap();
    store.clear_all().unwrap();
    assert!(store.list(None).unwrap().is_empty());
}

#[test]
fn test_undecodable_stored_entry_survives_mutations() {
    use std::sync::Arc;

    use actionlog_core::constants::SESSIONS_KEY;

    use crate::{KeyValueStore, MemoryKv, RecordStore};

    let kv = Arc::new(MemoryKv::new());
    kv.set(
        SESSIONS_KEY,
        r#"{"sessions":[{"id":"legacy","actionId":"action-1","createdAt":"not-a-date","topic":"t"}]}"#,
    )
    .unwrap();
    let store = RecordStore::new(Arc::clone(&kv));
    assert!(store.list(None).unwrap().is_empty());

    let added = knowledge("new");
    store.add(added.clone()).unwrap();
    let patch = SessionPatch { notes: Some("edited".to_owned()), ..SessionPatch::default() };
    assert!(store.update_by_id(added.id(), &patch).unwrap());
    assert!(!store.delete_by_id("legacy").unwrap());

    let raw: serde_json::Value = serde_json::from_str(&kv.get(SESSIONS_KEY).unwrap().unwrap()).unwrap();
    let entries = raw["sessions"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], added.id());
    assert_eq!(entries[1]["id"], "legacy");
    assert_eq!(entries[1]["createdAt"], "not-a-date");

    assert!(store.export_all().unwrap().contains("\"legacy\""));
    assert!(matches!(store.add(serde_json::from_value::<Session>(serde_json::json!({
        "id": "legacy",
        "actionId": "action-2",
        "createdAt": "2025-01-01T00:00:00Z",
        "observation": "o",
        "analysis": "a"
    })).unwrap()), Err(StorageError::Duplicate(_))));
}
