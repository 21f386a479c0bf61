#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use planner_core::data::kv_store::{KeyValueStore, MemoryStore, StorageError};
use planner_core::infrastructure::notifications::{
    InMemoryNotificationBackend, NotificationBackend, NotificationError, NotificationPayload,
    ScheduledNotification,
};
use planner_core::presentation::dto::TaskForm;
use planner_core::{NewTask, NotificationId, TaskType};

/// 2026-10-16 08:00 local.
pub fn fixed_now() -> NaiveDateTime {
    date(16).and_hms_opt(8, 0, 0).unwrap()
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn new_task(title: &str, day: u32, hour: u32, minute: u32) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        task_type: TaskType::Assignment,
        due_date: date(day),
        due_time: time(hour, minute),
    }
}

pub fn form(title: &str, due_date: &str, due_time: &str) -> TaskForm {
    TaskForm {
        title: title.to_string(),
        description: String::new(),
        task_type: TaskType::Exam,
        due_date: due_date.to_string(),
        due_time: due_time.to_string(),
    }
}

/// Memory store whose reads and writes can be made to fail.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes_left: AtomicUsize,
}

impl Default for FlakyStore {
    fn default() -> Self {
        Self {
            inner: MemoryStore::default(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes_left: AtomicUsize::new(usize::MAX),
        }
    }
}

impl FlakyStore {
    /// Lets `count` more writes through, then fails every later one.
    pub fn allow_writes(&self, count: usize) {
        self.writes_left.store(count, Ordering::SeqCst);
    }

    fn write_blocked(&self) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return true;
        }
        self.writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                usize::MAX => Some(usize::MAX),
                0 => None,
                n => Some(n - 1),
            })
            .is_err()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn broken(&self) -> StorageError {
        StorageError::Io(std::io::Error::other("disk unavailable"))
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(self.broken());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        if self.write_blocked() {
            return Err(self.broken());
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.write_blocked() {
            return Err(self.broken());
        }
        self.inner.remove(key).await
    }
}

/// In-memory backend that remembers every cancel request.
#[derive(Default)]
pub struct RecordingBackend {
    inner: InMemoryNotificationBackend,
    cancelled: Mutex<Vec<NotificationId>>,
}

impl RecordingBackend {
    pub fn cancelled(&self) -> Vec<NotificationId> {
        self.cancelled.lock().unwrap().clone()
    }

    pub async fn live(&self) -> Vec<ScheduledNotification> {
        self.inner.list_scheduled().await.unwrap()
    }
}

#[async_trait]
impl NotificationBackend for RecordingBackend {
    async fn schedule_repeating(
        &self,
        hour: u32,
        minute: u32,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        self.inner.schedule_repeating(hour, minute, payload).await
    }

    async fn schedule_once(
        &self,
        at: NaiveDateTime,
        payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        self.inner.schedule_once(at, payload).await
    }

    async fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
        self.cancelled.lock().unwrap().push(id.clone());
        self.inner.cancel(id).await
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        self.inner.cancel_all().await
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        self.inner.list_scheduled().await
    }
}

/// Backend where every call fails.
pub struct BrokenBackend;

fn unavailable() -> NotificationError {
    NotificationError::Backend("permission denied".into())
}

#[async_trait]
impl NotificationBackend for BrokenBackend {
    async fn schedule_repeating(
        &self,
        _hour: u32,
        _minute: u32,
        _payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        Err(unavailable())
    }

    async fn schedule_once(
        &self,
        _at: NaiveDateTime,
        _payload: NotificationPayload,
    ) -> Result<NotificationId, NotificationError> {
        Err(unavailable())
    }

    async fn cancel(&self, _id: &NotificationId) -> Result<(), NotificationError> {
        Err(unavailable())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        Err(unavailable())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, NotificationError> {
        Err(unavailable())
    }
}
