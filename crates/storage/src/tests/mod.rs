//! Test utilities and module declarations for storage tests.

use std::sync::Arc;

use crate::{MemoryKv, RecordStore, SqliteKv};
use actionlog_core::{
    HouseholdRecord, KnowledgeRecord, ReframeRecord, Session, WeightRecord, generate_id,
};
use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_sqlite_kv() -> (SqliteKv, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let kv = SqliteKv::new(&db_path).unwrap();
    (kv, temp_dir)
}

pub fn create_memory_store() -> RecordStore<Arc<MemoryKv>> {
    RecordStore::new(Arc::new(MemoryKv::new()))
}

pub fn knowledge(topic: &str) -> Session {
    Session::Knowledge(KnowledgeRecord {
        id: generate_id(),
        created_at: Utc::now(),
        topic: topic.to_owned(),
        core_question: format!("What matters about {topic}?"),
        notes: "notes".to_owned(),
    })
}

pub fn household(observation: &str) -> Session {
    Session::Household(HouseholdRecord {
        id: generate_id(),
        created_at: Utc::now(),
        observation: observation.to_owned(),
        analysis: "pattern".to_owned(),
    })
}

pub fn reframe(problem: &str, reframes: &[&str]) -> Session {
    Session::Reframe(ReframeRecord {
        id: generate_id(),
        created_at: Utc::now(),
        problem: problem.to_owned(),
        reframes: reframes.iter().map(|s| (*s).to_owned()).collect(),
    })
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn weight(date: &str, kg: f64) -> Session {
    Session::Weight(WeightRecord {
        id: generate_id(),
        created_at: Utc::now(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        weight_kg: kg,
        note: None,
    })
}

mod record_store_tests;
