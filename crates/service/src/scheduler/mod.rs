//! Reminder scheduling on top of a notification platform.
//!
//! The reminder list lives behind one async mutex. Every mutation re-reads
//! the stored list, applies its change and persists while holding it, so
//! concurrent fires are applied one after another and changes written by
//! another process are not overwritten.

mod platform;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;

use actionlog_core::constants::SCHEDULE_KEY;
use actionlog_core::{FireSpec, Recurrence, ScheduledItem, generate_id};
use actionlog_storage::KeyValueStore;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use tokio::sync::{Mutex, MutexGuard, mpsc};

use crate::error::ServiceError;

pub use platform::{NativeAlarm, NotificationPlatform, PlatformEvent, TokioTimerPlatform};

/// How often [`Scheduler::run`] picks up reminders changed by other processes.
const SYNC_INTERVAL: StdDuration = StdDuration::from_secs(30);

/// Parameters of a new or edited reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub title: String,
    pub body: Option<String>,
    pub spec: FireSpec,
}

pub struct Scheduler<P, K> {
    platform: P,
    kv: K,
    offset: FixedOffset,
    items: Mutex<Vec<ScheduledItem>>,
    permission: AtomicBool,
}

impl<P: NotificationPlatform, K: KeyValueStore> Scheduler<P, K> {
    /// Loads the persisted list. An unreadable list starts empty.
    pub fn new(platform: P, kv: K, offset: FixedOffset) -> Self {
        let items = load_items(&kv);
        tracing::debug!(count = items.len(), "reminders loaded");
        Self { platform, kv, offset, items: Mutex::new(items), permission: AtomicBool::new(false) }
    }

    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Asks the platform for permission and remembers the answer.
    pub async fn request_permission(&self) -> bool {
        let granted = self.platform.request_permission().await;
        self.permission.store(granted, Ordering::SeqCst);
        if !granted {
            tracing::warn!("notification permission denied");
        }
        granted
    }

    /// Creates and arms a reminder.
    ///
    /// # Errors
    /// [`ServiceError::InvalidInput`] for a blank title, missing permission,
    /// or a `date` reminder that is not in the future.
    pub async fn schedule(
        &self,
        request: ReminderRequest,
        now: DateTime<Utc>,
    ) -> Result<ScheduledItem, ServiceError> {
        let title = self.check_request(&request)?;
        let when = request.spec.first_fire(now, self.offset)?;
        let mut items = self.lock_fresh().await;
        let item = ScheduledItem {
            id: generate_id(),
            when,
            recurrence: request.spec.recurrence(),
            title,
            body: normalize_body(request.body),
            native_id: Some(next_native_id(&items)),
        };
        self.arm(&item).await?;
        items.push(item.clone());
        self.persist(&items);
        tracing::info!(id = %item.id, when = %item.when, recurrence = %item.recurrence, "reminder scheduled");
        Ok(item)
    }

    /// Disarms and deletes a reminder. Returns whether it existed.
    pub async fn cancel(&self, id: &str) -> bool {
        let mut items = self.lock_fresh().await;
        let Some(pos) = items.iter().position(|i| i.id == id) else {
            return false;
        };
        let item = items.remove(pos);
        if let Some(native_id) = item.native_id {
            self.platform.cancel(native_id).await;
        }
        self.persist(&items);
        tracing::info!(id, "reminder cancelled");
        true
    }

    /// Re-times an existing reminder, keeping its id.
    pub async fn edit(
        &self,
        id: &str,
        request: ReminderRequest,
        now: DateTime<Utc>,
    ) -> Result<ScheduledItem, ServiceError> {
        let title = self.check_request(&request)?;
        let when = request.spec.first_fire(now, self.offset)?;
        let mut items = self.lock_fresh().await;
        let fresh_native = next_native_id(&items);
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.to_owned()))?;
        if let Some(native_id) = item.native_id {
            self.platform.cancel(native_id).await;
        }
        item.when = when;
        item.recurrence = request.spec.recurrence();
        item.title = title;
        item.body = normalize_body(request.body);
        item.native_id = Some(item.native_id.unwrap_or(fresh_native));
        let armed = self.arm_or_disarm(item).await;
        let updated = item.clone();
        self.persist(&items);
        armed?;
        tracing::info!(id, when = %updated.when, "reminder edited");
        Ok(updated)
    }

    /// Snapshot of the reminder list, soonest first.
    pub async fn list(&self) -> Vec<ScheduledItem> {
        let mut items = self.lock_fresh().await.clone();
        items.sort_by_key(|i| i.when);
        items
    }

    /// Applies one delivered alarm. Daily reminders move forward by exactly
    /// one day and are re-armed; others stay listed but disarmed.
    ///
    /// A daily reminder that cannot be re-armed is still advanced and stored,
    /// disarmed, before the error is returned.
    pub async fn handle_fired(
        &self,
        native_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<ScheduledItem>, ServiceError> {
        let mut items = self.lock_fresh().await;
        let Some(item) = items.iter_mut().find(|i| i.native_id == Some(native_id)) else {
            tracing::debug!(native_id, "fired alarm has no reminder");
            return Ok(None);
        };
        tracing::info!(id = %item.id, title = %item.title, %now, "reminder fired");
        let fired = item.clone();
        let armed = if item.recurrence.repeats() {
            item.when += Duration::days(1);
            self.arm_or_disarm(item).await
        } else {
            item.native_id = None;
            Ok(())
        };
        self.persist(&items);
        armed?;
        Ok(Some(fired))
    }

    /// Re-arms reminders after a restart. Future items are armed as stored;
    /// daily items whose time passed while the process was down are rolled
    /// forward to their next occurrence. Returns how many were armed.
    pub async fn rehydrate(&self, now: DateTime<Utc>) -> Result<usize, ServiceError> {
        let mut items = self.lock_fresh().await;
        let mut next_id = next_native_id(&items);
        let mut armed = 0;
        let mut first_err = None;
        for item in items.iter_mut() {
            if item.recurrence == Recurrence::Daily {
                while item.when <= now {
                    item.when += Duration::days(1);
                }
            }
            if !item.is_pending(now) {
                item.native_id = None;
                continue;
            }
            if item.native_id.is_none() {
                item.native_id = Some(next_id);
                next_id = next_id.saturating_add(1);
            }
            match self.arm_or_disarm(item).await {
                Ok(()) => armed += 1,
                Err(e) => {
                    first_err.get_or_insert(e);
                },
            }
        }
        self.persist(&items);
        if let Some(e) = first_err {
            return Err(e);
        }
        tracing::info!(armed, total = items.len(), "reminders rehydrated");
        Ok(armed)
    }

    /// Brings platform alarms in line with the stored list: pending items are
    /// (re-)armed at their stored time and alarms whose reminder is gone are
    /// cancelled. Items already due are left for [`Self::handle_fired`].
    pub async fn sync_armed(&self, now: DateTime<Utc>) -> Result<usize, ServiceError> {
        let items = self.lock_fresh().await;
        let known: HashSet<i32> = items.iter().filter_map(|i| i.native_id).collect();
        for native_id in self.platform.pending().await {
            if !known.contains(&native_id) {
                tracing::debug!(native_id, "cancelling alarm of removed reminder");
                self.platform.cancel(native_id).await;
            }
        }
        let mut armed = 0;
        for item in items.iter().filter(|i| i.native_id.is_some() && i.is_pending(now)) {
            self.arm(item).await?;
            armed += 1;
        }
        Ok(armed)
    }

    /// Drops one-shot reminders that have already fired.
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut items = self.lock_fresh().await;
        let before = items.len();
        items.retain(|i| i.recurrence.repeats() || i.is_pending(now));
        let removed = before - items.len();
        if removed > 0 {
            self.persist(&items);
            tracing::info!(removed, "expired reminders pruned");
        }
        removed
    }

    /// Consumes platform events until the channel closes, calling
    /// `on_fire` for every reminder delivered. Between events the platform
    /// is periodically synced with the stored list.
    pub async fn run<F>(&self, mut events: mpsc::Receiver<PlatformEvent>, mut on_fire: F)
    where
        F: FnMut(&ScheduledItem) + Send,
    {
        let mut sync = tokio::time::interval(SYNC_INTERVAL);
        sync.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(PlatformEvent::Fired(native_id)) => {
                        match self.handle_fired(native_id, Utc::now()).await {
                            Ok(Some(item)) => on_fire(&item),
                            Ok(None) => {},
                            Err(e) => tracing::warn!(native_id, error = %e, "failed to re-arm reminder"),
                        }
                    },
                    Some(PlatformEvent::Tapped) => tracing::info!("notification tapped"),
                    None => break,
                },
                _ = sync.tick() => {
                    if let Err(e) = self.sync_armed(Utc::now()).await {
                        tracing::warn!(error = %e, "failed to sync reminders");
                    }
                },
            }
        }
        tracing::debug!("platform event channel closed");
    }

    fn check_request(&self, request: &ReminderRequest) -> Result<String, ServiceError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ServiceError::InvalidInput("reminder title is required".to_owned()));
        }
        if !self.permission.load(Ordering::SeqCst) {
            return Err(ServiceError::InvalidInput(
                "notification permission has not been granted".to_owned(),
            ));
        }
        Ok(title.to_owned())
    }

    /// Locks the list after refreshing it from storage. A store that cannot be
    /// read keeps the cached list.
    async fn lock_fresh(&self) -> MutexGuard<'_, Vec<ScheduledItem>> {
        let mut items = self.items.lock().await;
        match self.kv.get(SCHEDULE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(stored) => *items = stored,
                Err(e) => tracing::warn!(error = %e, "stored reminders are corrupt, using cached list"),
            },
            Ok(None) => items.clear(),
            Err(e) => tracing::warn!(error = %e, "failed to read reminders, using cached list"),
        }
        items
    }

    /// Arms `item`; on failure it is left disarmed so the stored list matches
    /// the platform.
    async fn arm_or_disarm(&self, item: &mut ScheduledItem) -> Result<(), ServiceError> {
        let result = self.arm(item).await;
        if let Err(e) = &result {
            tracing::warn!(id = %item.id, error = %e, "failed to arm reminder");
            item.native_id = None;
        }
        result
    }

    async fn arm(&self, item: &ScheduledItem) -> Result<(), ServiceError> {
        let Some(native_id) = item.native_id else {
            return Ok(());
        };
        self.platform
            .schedule(NativeAlarm {
                native_id,
                fire_at: item.when,
                repeat_daily: item.recurrence.repeats(),
                title: item.title.clone(),
                body: item.body.clone(),
            })
            .await
    }

    /// Best-effort write; failures are logged and swallowed.
    fn persist(&self, items: &[ScheduledItem]) {
        let result = serde_json::to_string(items)
            .map_err(ServiceError::from)
            .and_then(|json| self.kv.set(SCHEDULE_KEY, &json).map_err(ServiceError::from));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist reminders");
        }
    }
}

fn load_items<K: KeyValueStore>(kv: &K) -> Vec<ScheduledItem> {
    match kv.get(SCHEDULE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored reminders are corrupt, starting empty");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read reminders, starting empty");
            Vec::new()
        },
    }
}

fn next_native_id(items: &[ScheduledItem]) -> i32 {
    items.iter().filter_map(|i| i.native_id).max().map_or(1, |max| max.saturating_add(1))
}

fn normalize_body(body: Option<String>) -> Option<String> {
    body.map(|b| b.trim().to_owned()).filter(|b| !b.is_empty())
}
