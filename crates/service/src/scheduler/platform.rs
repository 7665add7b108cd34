//! Alarm delivery backends.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ServiceError;

/// One alarm handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAlarm {
    pub native_id: i32,
    pub fire_at: DateTime<Utc>,
    /// Informational; the scheduler re-arms daily items itself.
    pub repeat_daily: bool,
    pub title: String,
    pub body: Option<String>,
}

/// What the platform reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    Fired(i32),
    /// The user tapped a delivered notification.
    Tapped,
}

/// Where alarms are registered. Scheduling an id that is already armed
/// replaces the earlier alarm.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    async fn request_permission(&self) -> bool;
    async fn schedule(&self, alarm: NativeAlarm) -> Result<(), ServiceError>;
    async fn pending(&self) -> Vec<i32>;
    async fn cancel(&self, native_id: i32);
}

#[async_trait]
impl<P: NotificationPlatform + ?Sized> NotificationPlatform for std::sync::Arc<P> {
    async fn request_permission(&self) -> bool {
        (**self).request_permission().await
    }

    async fn schedule(&self, alarm: NativeAlarm) -> Result<(), ServiceError> {
        (**self).schedule(alarm).await
    }

    async fn pending(&self) -> Vec<i32> {
        (**self).pending().await
    }

    async fn cancel(&self, native_id: i32) {
        (**self).cancel(native_id).await;
    }
}

/// In-process alarms: one sleeping tokio task per alarm.
pub struct TokioTimerPlatform {
    events: mpsc::Sender<PlatformEvent>,
    timers: Mutex<HashMap<i32, JoinHandle<()>>>,
    granted: AtomicBool,
}

impl TokioTimerPlatform {
    /// Creates the platform and the receiver its events arrive on.
    #[must_use]
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<PlatformEvent>) {
        let (events, rx) = mpsc::channel(buffer.max(1));
        (Self { events, timers: Mutex::new(HashMap::new()), granted: AtomicBool::new(false) }, rx)
    }

    fn timers(&self) -> Result<std::sync::MutexGuard<'_, HashMap<i32, JoinHandle<()>>>, ServiceError> {
        self.timers
            .lock()
            .map_err(|e| ServiceError::NotConfigured(format!("timer registry poisoned: {e}")))
    }
}

#[async_trait]
impl NotificationPlatform for TokioTimerPlatform {
    async fn request_permission(&self) -> bool {
        self.granted.store(true, Ordering::SeqCst);
        true
    }

    async fn schedule(&self, alarm: NativeAlarm) -> Result<(), ServiceError> {
        let delay = (alarm.fire_at - Utc::now()).to_std().unwrap_or_default();
        let deadline = tokio::time::Instant::now() + delay;
        let events = self.events.clone();
        let native_id = alarm.native_id;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if events.send(PlatformEvent::Fired(native_id)).await.is_err() {
                tracing::debug!(native_id, "alarm fired with no listener");
            }
        });
        if let Some(previous) = self.timers()?.insert(native_id, handle) {
            previous.abort();
        }
        tracing::debug!(native_id, fire_at = %alarm.fire_at, "timer armed");
        Ok(())
    }

    async fn pending(&self) -> Vec<i32> {
        let Ok(mut timers) = self.timers() else {
            return Vec::new();
        };
        timers.retain(|_, handle| !handle.is_finished());
        let mut ids: Vec<i32> = timers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    async fn cancel(&self, native_id: i32) {
        if let Ok(mut timers) = self.timers()
            && let Some(handle) = timers.remove(&native_id)
        {
            handle.abort();
            tracing::debug!(native_id, "timer cancelled");
        }
    }
}

impl Drop for TokioTimerPlatform {
    fn drop(&mut self) {
        if let Ok(timers) = self.timers.get_mut() {
            for handle in timers.values() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn alarm(native_id: i32, in_secs: i64) -> NativeAlarm {
        NativeAlarm {
            native_id,
            fire_at: Utc::now() + chrono::Duration::seconds(in_secs),
            repeat_daily: false,
            title: "t".to_owned(),
            body: None,
        }
    }

    #[tokio::test]
    async fn due_alarm_emits_fired() {
        let (platform, mut rx) = TokioTimerPlatform::new(4);
        platform.schedule(alarm(7, -1)).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(event, Some(PlatformEvent::Fired(7)));
    }

    #[tokio::test]
    async fn cancelled_alarm_is_no_longer_pending() {
        let (platform, _rx) = TokioTimerPlatform::new(4);
        platform.schedule(alarm(1, 3600)).await.unwrap();
        platform.schedule(alarm(2, 3600)).await.unwrap();
        assert_eq!(platform.pending().await, vec![1, 2]);

        platform.cancel(1).await;
        assert_eq!(platform.pending().await, vec![2]);
    }

    #[tokio::test]
    async fn rescheduling_same_id_replaces_timer() {
        let (platform, _rx) = TokioTimerPlatform::new(4);
        platform.schedule(alarm(3, 3600)).await.unwrap();
        platform.schedule(alarm(3, 7200)).await.unwrap();
        assert_eq!(platform.pending().await, vec![3]);
    }
}
