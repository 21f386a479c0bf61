//! Platform alarm scheduling as seen by the reminder core.
//!
//! Backends hand out opaque [`NotificationId`]s. Cancelling an id that is
//! unknown or has already fired is not an error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::data::kv_store::{KeyValueStore, NOTIFICATIONS_KEY, read_json, write_json};
use crate::domain::task::NotificationId;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification backend error: {0}")]
    Backend(String),
    #[error("notification storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub task_id: Uuid,
    #[serde(default)]
    pub recurring: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Trigger {
    Daily { hour: u32, minute: u32 },
    Once { at: NaiveDateTime },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotification {
    pub id: NotificationId,
    pub trigger: Trigger,
    pub payload: NotificationPayload,
}

#[async_trait]
pub trait NotificationBackend: Send + Sync {
    async fn schedule_repeating(
        &self,
        hour: u32,
        minute: u32,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError>;
    async fn schedule_once(
        &self,
        at: NaiveDateTime,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError>;
    async fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError>;
    async fn cancel_all(&self) -> Result<(), NotificationError>;
    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError>;
}

fn check_time(hour: u32, minute: u32) -> Result<(), NotificationError> {
    if hour > 23 || minute > 59 {
        return Err(NotificationError::Backend(format!(
            "invalid daily trigger {hour:02}:{minute:02}"
        )));
    }
    Ok(())
}

/// Keeps alarms in process memory. Ids are sequential (`n-1`, `n-2`, ...).
#[derive(Debug, Default)]
pub struct InMemoryNotificationBackend {
    next_id: AtomicU64,
    scheduled: Mutex<BTreeMap<u64, ScheduledNotification>>,
}

impl InMemoryNotificationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert(&self, trigger: Trigger, payload: NotificationPayload) -> NotificationId {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let id = NotificationId::new(format!("n-{seq}"));
        self.scheduled.lock().await.insert(
            seq,
            ScheduledNotification {
                id: id.clone(),
                trigger,
                payload,
            },
        );
        id
    }
}

#[async_trait]
impl NotificationBackend for InMemoryNotificationBackend {
    async fn schedule_repeating(
        &self,
        hour: u32,
        minute: u32,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        check_time(hour, minute)?;
        Ok(self.insert(Trigger::Daily { hour, minute }, payload).await)
    }

    async fn schedule_once(
        &self,
        at: NaiveDateTime,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        Ok(self.insert(Trigger::Once { at }, payload).await)
    }

    async fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
        self.scheduled.lock().await.retain(|_, n| &n.id != id);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        self.scheduled.lock().await.clear();
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        Ok(self.scheduled.lock().await.values().cloned().collect())
    }
}

/// Persists scheduled alarms under the `notifications` key so that a
/// front end without a platform scheduler can inspect them between runs.
#[derive(Clone)]
pub struct StoredNotificationBackend<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
}

impl<S: KeyValueStore + ?Sized> StoredNotificationBackend<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        read_json::<Vec<ScheduledNotification>, S>(self.store.as_ref(), NOTIFICATIONS_KEY)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| NotificationError::Storage(e.to_string()))
    }

    async fn save(&self, scheduled: &[ScheduledNotification]) -> Result<(), NotificationError> {
        write_json(self.store.as_ref(), NOTIFICATIONS_KEY, scheduled)
            .await
            .map_err(|e| NotificationError::Storage(e.to_string()))
    }

    async fn push(
        &self,
        trigger: Trigger,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        let mut scheduled = self.load().await?;
        let id = NotificationId::new(Uuid::new_v4().to_string());
        scheduled.push(ScheduledNotification {
            id: id.clone(),
            trigger,
            payload,
        });
        self.save(&scheduled).await?;
        info!(notification_id = %id, "notification scheduled");
        Ok(id)
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> NotificationBackend for StoredNotificationBackend<S> {
    async fn schedule_repeating(
        &self,
        hour: u32,
        minute: u32,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        check_time(hour, minute)?;
        self.push(Trigger::Daily { hour, minute }, payload).await
    }

    async fn schedule_once(
        &self,
        at: NaiveDateTime,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        self.push(Trigger::Once { at }, payload).await
    }

    async fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
        let mut scheduled = self.load().await?;
        let before = scheduled.len();
        scheduled.retain(|n| &n.id != id);
        if scheduled.len() == before {
            debug!(notification_id = %id, "cancel for unknown notification");
            return Ok(());
        }
        self.save(&scheduled).await?;
        info!(notification_id = %id, "notification cancelled");
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        self.save(&[]).await?;
        info!("all notifications cancelled");
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::kv_store::MemoryStore;

    fn payload() -> NotificationPayload {
        NotificationPayload {
            title: "Daily Reminder: Essay".into(),
            body: "Assignment due on 10/20/2026".into(),
            task_id: Uuid::new_v4(),
            recurring: true,
        }
    }

    #[tokio::test]
    async fn in_memory_cancel_is_idempotent() {
        let backend = InMemoryNotificationBackend::new();
        let id = backend.schedule_repeating(9, 0, payload()).await.unwrap();
        assert_eq!(id.as_str(), "n-1");

        backend.cancel(&id).await.unwrap();
        backend.cancel(&id).await.unwrap();
        assert!(backend.list_scheduled().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_out_of_range_daily_trigger() {
        let backend = InMemoryNotificationBackend::new();
        assert!(backend.schedule_repeating(24, 0, payload()).await.is_err());
    }

    #[tokio::test]
    async fn stored_backend_survives_reopen() {
        let store = Arc::new(MemoryStore::new());
        let first = StoredNotificationBackend::new(Arc::clone(&store));
        let id = first.schedule_repeating(7, 30, payload()).await.unwrap();

        let second = StoredNotificationBackend::new(store);
        let listed = second.list_scheduled().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].trigger, Trigger::Daily { hour: 7, minute: 30 });

        second.cancel_all().await.unwrap();
        assert!(first.list_scheduled().await.unwrap().is_empty());
    }
}
