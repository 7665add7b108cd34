use std::path::Path;
use std::sync::Arc;

use actionlog_core::ActionId;
use actionlog_service::{HistoryFilter, HistoryService, summary_line};
use actionlog_storage::{RecordStore, SqliteKv};
use anyhow::Result;

use crate::open_kv;

fn history() -> Result<HistoryService<Arc<SqliteKv>>> {
    Ok(HistoryService::new(RecordStore::new(open_kv()?)))
}

pub(crate) fn run_list(action: Option<ActionId>) -> Result<()> {
    let sessions = history()?.filtered(HistoryFilter::from(action))?;
    if sessions.is_empty() {
        println!("No records.");
    }
    for session in &sessions {
        println!("{}", summary_line(session));
    }
    Ok(())
}

pub(crate) fn run_show(id: &str) -> Result<()> {
    let history = history()?;
    let session = history.get(id)?;
    println!("{}  {}", session.id(), session.created_at().to_rfc3339());
    println!("{}", history.describe(id)?);
    Ok(())
}

pub(crate) fn run_delete(id: &str, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("refusing to delete {id} without --yes");
    }
    history()?.delete(id, yes)?;
    println!("Deleted {id}");
    Ok(())
}

pub(crate) fn run_export(out: Option<&Path>) -> Result<()> {
    let history = history()?;
    match out {
        Some(path) => {
            history.export_to(path)?;
            println!("Exported to {}", path.display());
        },
        None => println!("{}", history.export_string()?),
    }
    Ok(())
}

pub(crate) fn run_import(file: &Path) -> Result<()> {
    let imported = history()?.import_from(file)?;
    println!("Imported {imported} record(s)");
    Ok(())
}

pub(crate) fn run_clear(yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("refusing to clear all records without --yes");
    }
    history()?.clear(yes)?;
    println!("All records cleared");
    Ok(())
}

pub(crate) fn run_compose(ids: &[String]) -> Result<()> {
    print!("{}", history()?.compose_references(ids)?);
    Ok(())
}
