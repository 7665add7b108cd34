//! Session collection persisted as one JSON blob.

use std::collections::HashSet;

use actionlog_core::constants::SESSIONS_KEY;
use actionlog_core::{ActionId, Session, SessionPatch};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StorageError};
use crate::kv::KeyValueStore;

/// One stored entry. Entries this build cannot decode are carried verbatim
/// so that a read-modify-write never drops them.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Entry {
    Known(Session),
    Opaque(Value),
}

impl Entry {
    fn id(&self) -> Option<&str> {
        match self {
            Self::Known(session) => Some(session.id()),
            Self::Opaque(value) => value.get("id").and_then(Value::as_str),
        }
    }

    fn into_session(self) -> Option<Session> {
        match self {
            Self::Known(session) => Some(session),
            Self::Opaque(_) => None,
        }
    }
}

#[derive(Serialize)]
struct Blob<'a> {
    sessions: &'a [Entry],
}

/// Owns the persisted session collection.
///
/// Every mutation is a read-modify-write of the whole blob. Records are kept
/// most-recent-first: `add` prepends. Stored entries that do not decode are
/// hidden from reads but written back unchanged.
#[derive(Debug, Clone)]
pub struct RecordStore<K> {
    kv: K,
}

impl<K: KeyValueStore> RecordStore<K> {
    pub const fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Prepends `session` and persists.
    ///
    /// # Errors
    /// Returns [`StorageError::Duplicate`] if the id is already taken.
    pub fn add(&self, session: Session) -> Result<()> {
        let mut entries = self.load()?;
        if entries.iter().any(|e| e.id() == Some(session.id())) {
            return Err(StorageError::Duplicate(session.id().to_owned()));
        }
        tracing::debug!(id = session.id(), action = %session.action_id(), "adding session");
        entries.insert(0, Entry::Known(session));
        self.save(&entries)
    }

    /// All sessions, or only those of one action, in storage order.
    pub fn list(&self, filter: Option<ActionId>) -> Result<Vec<Session>> {
        let sessions = self.load()?.into_iter().filter_map(Entry::into_session);
        Ok(match filter {
            Some(action) => sessions.filter(|s| s.action_id() == action).collect(),
            None => sessions.collect(),
        })
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.load()?.into_iter().filter_map(Entry::into_session).find(|s| s.id() == id))
    }

    /// Merges `patch` into the matching record. Returns `false` (and writes
    /// nothing) when the id is absent.
    pub fn update_by_id(&self, id: &str, patch: &SessionPatch) -> Result<bool> {
        let mut entries = self.load()?;
        let Some(session) = entries.iter_mut().find_map(|e| match e {
            Entry::Known(session) if session.id() == id => Some(session),
            _ => None,
        }) else {
            return Ok(false);
        };
        session.apply_patch(patch);
        self.save(&entries)?;
        Ok(true)
    }

    /// Removes the matching record. Returns whether anything was removed.
    pub fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| !matches!(e, Entry::Known(session) if session.id() == id));
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }

    /// Pretty-printed `{ "sessions": [...] }`, including stored entries that
    /// do not decode as a session.
    pub fn export_all(&self) -> Result<String> {
        let entries = self.load()?;
        Ok(serde_json::to_string_pretty(&Blob { sessions: &entries })?)
    }

    /// Replaces the whole collection with the sessions in `text`.
    ///
    /// Falsy entries and entries that do not decode as a session are dropped.
    ///
    /// # Errors
    /// Returns [`StorageError::MalformedImport`] when `text` is not an object
    /// with a `sessions` array; the existing collection is left untouched.
    pub fn import_all(&self, text: &str) -> Result<usize> {
        let parsed: Value = serde_json::from_str(text)
            .map_err(|e| StorageError::MalformedImport(format!("not valid JSON: {e}")))?;
        let Some(entries) = parsed.get("sessions").and_then(Value::as_array) else {
            return Err(StorageError::MalformedImport(
                "expected an object with a \"sessions\" array".to_owned(),
            ));
        };
        let sessions: Vec<Entry> = decode_entries(entries)
            .into_iter()
            .filter(|e| matches!(e, Entry::Known(_)))
            .collect();
        let imported = sessions.len();
        self.save(&sessions)?;
        tracing::info!(imported, "imported sessions");
        Ok(imported)
    }

    pub fn clear_all(&self) -> Result<()> {
        self.save(&[])
    }

    fn load(&self) -> Result<Vec<Entry>> {
        let Some(raw) = self.kv.get(SESSIONS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => match value.get("sessions").and_then(Value::as_array) {
                Some(entries) => Ok(decode_entries(entries)),
                None => {
                    tracing::warn!("stored session blob has no sessions array, treating as empty");
                    Ok(Vec::new())
                },
            },
            Err(e) => {
                tracing::warn!(error = %e, "stored session blob is corrupt, treating as empty");
                Ok(Vec::new())
            },
        }
    }

    fn save(&self, entries: &[Entry]) -> Result<()> {
        let json = serde_json::to_string(&Blob { sessions: entries })?;
        self.kv.set(SESSIONS_KEY, &json)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn decode_entries(entries: &[Value]) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| is_truthy(entry))
        .map(|entry| match serde_json::from_value::<Session>(entry.clone()) {
            Ok(session) => Entry::Known(session),
            Err(e) => {
                tracing::warn!(error = %e, "keeping undecodable session entry as is");
                Entry::Opaque(entry.clone())
            },
        })
        .filter(|entry| {
            let Some(id) = entry.id() else {
                return true;
            };
            let fresh = seen.insert(id.to_owned());
            if !fresh {
                tracing::warn!(id, "skipping duplicate session id");
            }
            fresh
        })
        .collect()
}
