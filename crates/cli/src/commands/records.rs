use std::sync::Arc;

use actionlog_core::ActionId;
use actionlog_service::{WeightLog, session_from_payload};
use actionlog_storage::{RecordStore, SqliteKv};
use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use serde_json::{Value, json};

use crate::open_kv;

fn save_payload(action: ActionId, payload: &Value) -> Result<()> {
    let store = RecordStore::new(open_kv()?);
    let session = session_from_payload(action, payload, Utc::now())?;
    let id = session.id().to_owned();
    store.add(session)?;
    println!("Saved {} record {id}", action.title());
    Ok(())
}

pub(crate) fn run_knowledge(topic: String, question: String, notes: Option<String>) -> Result<()> {
    save_payload(
        ActionId::Knowledge,
        &json!({ "topic": topic, "coreQuestion": question, "notes": notes.unwrap_or_default() }),
    )
}

pub(crate) fn run_household(observation: String, analysis: String) -> Result<()> {
    save_payload(ActionId::Household, &json!({ "observation": observation, "analysis": analysis }))
}

pub(crate) fn run_reframe(problem: String, reframes: Vec<String>) -> Result<()> {
    save_payload(ActionId::Reframe, &json!({ "problem": problem, "reframes": reframes }))
}

fn weight_log() -> Result<WeightLog<Arc<SqliteKv>>> {
    Ok(WeightLog::new(RecordStore::new(open_kv()?)))
}

pub(crate) fn run_weight_add(kg: f64, date: Option<NaiveDate>, note: Option<String>) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let record = weight_log()?.add_entry(date, kg, note.as_deref())?;
    println!("Logged {}kg for {} ({})", record.weight_kg, record.date, record.id);
    Ok(())
}

pub(crate) fn run_weight_list(limit: usize) -> Result<()> {
    let entries = weight_log()?.latest(limit)?;
    if entries.is_empty() {
        println!("No weight entries.");
    }
    for entry in entries {
        match entry.note {
            Some(note) => println!("{}  {:>6.1}kg  {note}", entry.date, entry.weight_kg),
            None => println!("{}  {:>6.1}kg", entry.date, entry.weight_kg),
        }
    }
    Ok(())
}

pub(crate) fn run_weight_trend() -> Result<()> {
    let Some(trend) = weight_log()?.trend()? else {
        println!("At least two weight entries are needed for a trend.");
        return Ok(());
    };
    for (date, kg) in &trend.points {
        println!("{date}  {kg:.1}");
    }
    println!("min {:.1}kg  max {:.1}kg", trend.min, trend.max);
    Ok(())
}
