//! Browsing, bulk transfer, and reference drafting over the record store.

use std::fmt::Write as _;
use std::path::Path;

use actionlog_core::{ActionId, Session};
use actionlog_llm::prompts::record_context;
use actionlog_storage::{KeyValueStore, RecordStore};

use crate::error::ServiceError;

/// Which records a history view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Action(ActionId),
}

impl From<Option<ActionId>> for HistoryFilter {
    fn from(action: Option<ActionId>) -> Self {
        action.map_or(Self::All, Self::Action)
    }
}

pub struct HistoryService<K> {
    store: RecordStore<K>,
}

impl<K: KeyValueStore> HistoryService<K> {
    pub const fn new(store: RecordStore<K>) -> Self {
        Self { store }
    }

    /// Matching records, newest first.
    pub fn filtered(&self, filter: HistoryFilter) -> Result<Vec<Session>, ServiceError> {
        let action = match filter {
            HistoryFilter::All => None,
            HistoryFilter::Action(action) => Some(action),
        };
        Ok(self.store.list(action)?)
    }

    pub fn get(&self, id: &str) -> Result<Session, ServiceError> {
        self.store.get_by_id(id)?.ok_or_else(|| ServiceError::NotFound(id.to_owned()))
    }

    /// Deletes one record. Destructive, so the caller must confirm.
    pub fn delete(&self, id: &str, confirmed: bool) -> Result<(), ServiceError> {
        require_confirmation(confirmed, "delete")?;
        if !self.store.delete_by_id(id)? {
            return Err(ServiceError::NotFound(id.to_owned()));
        }
        tracing::info!(id, "session deleted");
        Ok(())
    }

    pub fn export_string(&self) -> Result<String, ServiceError> {
        Ok(self.store.export_all()?)
    }

    /// Writes the whole store to `path` as pretty JSON.
    pub fn export_to(&self, path: &Path) -> Result<(), ServiceError> {
        let text = self.export_string()?;
        std::fs::write(path, text)?;
        tracing::info!(path = %path.display(), "sessions exported");
        Ok(())
    }

    /// Replaces the store with the sessions in `text`, returning how many
    /// were imported. A malformed document leaves the store untouched.
    pub fn import_str(&self, text: &str) -> Result<usize, ServiceError> {
        Ok(self.store.import_all(text)?)
    }

    pub fn import_from(&self, path: &Path) -> Result<usize, ServiceError> {
        let text = std::fs::read_to_string(path)?;
        self.import_str(&text)
    }

    /// Wipes every record. Destructive, so the caller must confirm.
    pub fn clear(&self, confirmed: bool) -> Result<(), ServiceError> {
        require_confirmation(confirmed, "clear")?;
        self.store.clear_all()?;
        tracing::info!("all sessions cleared");
        Ok(())
    }

    /// Markdown bullets referencing the given records, in the order given.
    pub fn compose_references(&self, ids: &[String]) -> Result<String, ServiceError> {
        let mut out = String::new();
        for id in ids {
            let session = self.get(id)?;
            out.push_str(&reference_line(&session));
        }
        Ok(out)
    }

    /// Context block describing one record.
    pub fn describe(&self, id: &str) -> Result<String, ServiceError> {
        Ok(record_context(&self.get(id)?))
    }
}

fn require_confirmation(confirmed: bool, op: &str) -> Result<(), ServiceError> {
    if confirmed {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!("{op} is destructive and must be confirmed")))
    }
}

/// One-line label used by listings.
#[must_use]
pub fn summary_line(session: &Session) -> String {
    let detail = match session {
        Session::Knowledge(r) => r.topic.clone(),
        Session::Household(r) => r.observation.clone(),
        Session::Reframe(r) => r.problem.clone(),
        Session::Weight(r) => format!("{} {}kg", r.date, r.weight_kg),
    };
    format!(
        "{}  [{}] {}  {}",
        session.id(),
        session.action_id().short_tag(),
        session.created_at().format("%Y-%m-%d %H:%M"),
        detail
    )
}

fn reference_line(session: &Session) -> String {
    let tag = session.action_id().short_tag();
    let mut line = String::new();
    match session {
        Session::Knowledge(r) => {
            let _ = writeln!(line, "- [{tag}] {}: {}", r.topic, r.core_question);
            if !r.notes.is_empty() {
                let _ = writeln!(line, "  {}", r.notes);
            }
        },
        Session::Household(r) => {
            let _ = writeln!(line, "- [{tag}] {}", r.observation);
            let _ = writeln!(line, "  {}", r.analysis);
        },
        Session::Reframe(r) => {
            let _ = writeln!(line, "- [{tag}] {}", r.problem);
            for reframe in &r.reframes {
                let _ = writeln!(line, "  - {reframe}");
            }
        },
        Session::Weight(r) => {
            let _ = writeln!(line, "- [{tag}] {} {}kg", r.date, r.weight_kg);
            if let Some(note) = &r.note {
                let _ = writeln!(line, "  {note}");
            }
        },
    }
    line
}
