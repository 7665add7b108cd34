//! Daily weight entries kept alongside the journal records.

use actionlog_core::{ActionId, Session, WeightRecord, generate_id};
use actionlog_storage::{KeyValueStore, RecordStore};
use chrono::{NaiveDate, Utc};

use crate::error::ServiceError;

/// Weight series prepared for charting, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTrend {
    pub points: Vec<(NaiveDate, f64)>,
    pub min: f64,
    pub max: f64,
}

pub struct WeightLog<K> {
    store: RecordStore<K>,
}

impl<K: KeyValueStore> WeightLog<K> {
    pub const fn new(store: RecordStore<K>) -> Self {
        Self { store }
    }

    /// Records one weight measurement.
    ///
    /// # Errors
    /// [`ServiceError::InvalidInput`] for a non-finite or non-positive weight;
    /// the store is not touched in that case.
    pub fn add_entry(
        &self,
        date: NaiveDate,
        weight_kg: f64,
        note: Option<&str>,
    ) -> Result<WeightRecord, ServiceError> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(ServiceError::InvalidInput(format!(
                "weight must be a positive number, got {weight_kg}"
            )));
        }
        let record = WeightRecord {
            id: generate_id(),
            created_at: Utc::now(),
            date,
            weight_kg,
            note: note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_owned),
        };
        self.store.add(Session::Weight(record.clone()))?;
        tracing::info!(%date, weight_kg, "weight entry added");
        Ok(record)
    }

    /// The newest `limit` entries, newest first.
    pub fn latest(&self, limit: usize) -> Result<Vec<WeightRecord>, ServiceError> {
        let mut entries = self.entries()?;
        entries.truncate(limit);
        Ok(entries)
    }

    /// Every entry oldest first, with the range of weights. `None` until
    /// there are at least two entries to draw a line through.
    pub fn trend(&self) -> Result<Option<WeightTrend>, ServiceError> {
        let mut entries = self.entries()?;
        if entries.len() < 2 {
            return Ok(None);
        }
        entries.reverse();
        let points: Vec<_> = entries.iter().map(|e| (e.date, e.weight_kg)).collect();
        let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        Ok(Some(WeightTrend { points, min, max }))
    }

    fn entries(&self) -> Result<Vec<WeightRecord>, ServiceError> {
        Ok(self
            .store
            .list(Some(ActionId::Weight))?
            .into_iter()
            .filter_map(|s| match s {
                Session::Weight(record) => Some(record),
                _ => None,
            })
            .collect())
    }
}
