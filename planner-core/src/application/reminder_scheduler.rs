//! Decides when a task's reminder fires and keeps its handle current.
//!
//! Every arming call first cancels whatever handle the task already holds,
//! so a task never owns more than one live alarm. Backend failures are
//! logged and degrade to "no reminder"; they never block saving the task.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Timelike};
use tracing::{debug, error, info, warn};

use crate::domain::task::{NotificationId, Task, local_now};
use crate::infrastructure::notifications::{NotificationBackend, NotificationPayload};

/// Which arming policy the task service applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderMode {
    /// Repeat every day at the due time until the task falls due.
    #[default]
    Daily,
    /// Fire once at the due instant.
    Once,
}

impl FromStr for ReminderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReminderMode::Daily),
            "once" => Ok(ReminderMode::Once),
            other => Err(format!("unknown reminder mode '{other}'")),
        }
    }
}

impl fmt::Display for ReminderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderMode::Daily => f.write_str("daily"),
            ReminderMode::Once => f.write_str("once"),
        }
    }
}

/// First time a daily alarm at the task's hour:minute fires after `now`.
/// A slot equal to `now` counts as already passed.
pub fn first_daily_fire(task: &Task, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(task.due_time);
    if today <= now {
        today + Duration::days(1)
    } else {
        today
    }
}

pub struct ReminderScheduler<N: NotificationBackend + ?Sized> {
    backend: Arc<N>,
}

impl<N: NotificationBackend + ?Sized> Clone for ReminderScheduler<N> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<N: NotificationBackend + ?Sized> ReminderScheduler<N> {
    pub fn new(backend: Arc<N>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<N> {
        &self.backend
    }

    pub async fn arm_with_at(
        &self,
        mode: ReminderMode,
        task: &Task,
        now: NaiveDateTime,
    ) -> Option<NotificationId> {
        match mode {
            ReminderMode::Daily => self.arm_at(task, now).await,
            ReminderMode::Once => self.arm_once_at(task, now).await,
        }
    }

    /// Arms a daily repeating reminder for `task`.
    pub async fn arm(&self, task: &Task) -> Option<NotificationId> {
        self.arm_at(task, local_now()).await
    }

    pub async fn arm_at(&self, task: &Task, now: NaiveDateTime) -> Option<NotificationId> {
        self.release(task).await?;
        if task.completed {
            return None;
        }

        let due = task.due_at();
        let first_fire = first_daily_fire(task, now);
        if first_fire > due {
            debug!(task_id = %task.id, %first_fire, %due, "first reminder would fire after due time");
            return None;
        }

        let payload = NotificationPayload {
            title: format!("Daily Reminder: {}", task.title),
            body: format!(
                "{} due on {}",
                task.task_type,
                task.due_date.format("%m/%d/%Y")
            ),
            task_id: task.id,
            recurring: true,
        };
        let (hour, minute) = (task.due_time.hour(), task.due_time.minute());
        match self.backend.schedule_repeating(hour, minute, payload).await {
            Ok(id) => {
                info!(task_id = %task.id, notification_id = %id, %first_fire, "daily reminder armed");
                Some(id)
            }
            Err(e) => {
                error!("failed to schedule reminder for task {}: {}", task.id, e);
                None
            }
        }
    }

    /// Arms a single alarm at the task's due instant.
    pub async fn arm_once(&self, task: &Task) -> Option<NotificationId> {
        self.arm_once_at(task, local_now()).await
    }

    pub async fn arm_once_at(&self, task: &Task, now: NaiveDateTime) -> Option<NotificationId> {
        self.release(task).await?;
        let due = task.due_at();
        if task.completed || due <= now {
            return None;
        }

        let type_label = task.task_type.label();
        let payload = NotificationPayload {
            title: format!("{}: {}", type_label, task.title),
            body: task
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| {
                    format!("Don't forget about your {}!", type_label.to_lowercase())
                }),
            task_id: task.id,
            recurring: false,
        };
        match self.backend.schedule_once(due, payload).await {
            Ok(id) => {
                info!(task_id = %task.id, notification_id = %id, %due, "one-shot reminder armed");
                Some(id)
            }
            Err(e) => {
                error!("failed to schedule reminder for task {}: {}", task.id, e);
                None
            }
        }
    }

    /// Cancels `handle` if present. Returns whether a cancel was issued
    /// and accepted by the backend.
    pub async fn cancel(&self, handle: Option<&NotificationId>) -> bool {
        let Some(id) = handle else {
            return false;
        };
        match self.backend.cancel(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to cancel notification {}: {}", id, e);
                false
            }
        }
    }

    // `None` aborts arming: a failed cancel means the backend is unusable.
    async fn release(&self, task: &Task) -> Option<()> {
        match &task.notification_id {
            Some(id) => self.cancel(Some(id)).await.then_some(()),
            None => Some(()),
        }
    }
}
