use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::application::reminder_scheduler::{ReminderMode, ReminderScheduler};
use crate::data::task_repository::TaskRepository;
use crate::domain::error::DomainError;
use crate::domain::task::{NewTask, Task, TaskPatch, TaskType, local_now};
use crate::infrastructure::notifications::{NotificationBackend, ScheduledNotification};

/// Open tasks grouped the way the home screen shows them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Agenda {
    pub today: Vec<Task>,
    /// Due tomorrow or later, soonest first.
    pub upcoming: Vec<Task>,
}

pub struct TaskService<R, N>
where
    R: TaskRepository + ?Sized,
    N: NotificationBackend + ?Sized,
{
    repo: Arc<R>,
    scheduler: ReminderScheduler<N>,
    mode: ReminderMode,
    clock: fn() -> NaiveDateTime,
}

impl<R, N> Clone for TaskService<R, N>
where
    R: TaskRepository + ?Sized,
    N: NotificationBackend + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            scheduler: self.scheduler.clone(),
            mode: self.mode,
            clock: self.clock,
        }
    }
}

impl<R, N> TaskService<R, N>
where
    R: TaskRepository + ?Sized,
    N: NotificationBackend + ?Sized,
{
    pub fn new(repo: Arc<R>, scheduler: ReminderScheduler<N>, mode: ReminderMode) -> Self {
        Self {
            repo,
            scheduler,
            mode,
            clock: local_now,
        }
    }

    /// Replaces the source of "now" used when arming reminders.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.repo.list_all().await
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .ok_or(DomainError::TaskNotFound(id))
    }

    pub async fn agenda(&self, today: NaiveDate) -> Agenda {
        let mut agenda = Agenda::default();
        for task in self.repo.list_all().await {
            if task.completed {
                continue;
            }
            if task.due_date == today {
                agenda.today.push(task);
            } else if task.due_date > today {
                agenda.upcoming.push(task);
            }
        }
        agenda.today.sort_by_key(Task::due_at);
        agenda.upcoming.sort_by_key(Task::due_at);
        agenda
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_task(&self, input: NewTask) -> Result<Task, DomainError> {
        let task = self.repo.create(input).await?;
        self.sync_reminder(task).await
    }

    /// Merges `patch` into the task and re-arms its reminder. The previous
    /// handle is always cancelled; the stored handle ends up as whatever the
    /// scheduler returned, so completed tasks are left without one.
    #[instrument(skip(self, patch))]
    pub async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task, DomainError> {
        let task = self
            .repo
            .update(id, patch)
            .await?
            .ok_or(DomainError::TaskNotFound(id))?;
        self.sync_reminder(task).await
    }

    pub async fn edit_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task, DomainError> {
        self.update_task(id, patch).await
    }

    pub async fn toggle_completion(&self, id: Uuid) -> Result<Task, DomainError> {
        let current = self.get_task(id).await?;
        self.update_task(id, TaskPatch::completed(!current.completed))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_task(&self, id: Uuid) -> Result<(), DomainError> {
        let task = self.get_task(id).await?;
        self.scheduler.cancel(task.notification_id.as_ref()).await;
        self.repo.delete(id).await
    }

    pub async fn scheduled_reminders(&self) -> Vec<ScheduledNotification> {
        self.scheduler
            .backend()
            .list_scheduled()
            .await
            .unwrap_or_else(|e| {
                warn!("failed to list scheduled notifications: {}", e);
                Vec::new()
            })
    }

    pub async fn cancel_all_reminders(&self) -> bool {
        match self.scheduler.backend().cancel_all().await {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to cancel notifications: {}", e);
                false
            }
        }
    }

    /// Writes a few example tasks when the store is empty. Returns whether
    /// anything was written.
    pub async fn seed_sample_data(&self, today: NaiveDate) -> Result<bool, DomainError> {
        if !self.repo.load().await?.is_empty() {
            return Ok(false);
        }
        let sample = |title: &str,
                      description: &str,
                      task_type: TaskType,
                      days: i64,
                      (hour, minute): (u32, u32)| {
            Task::new(NewTask {
                title: title.to_string(),
                description: Some(description.to_string()),
                task_type,
                due_date: today + Duration::days(days),
                due_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default(),
            })
        };
        let tasks = vec![
            sample("Math Exam", "Final exam for Algebra II", TaskType::Exam, 1, (9, 0)),
            sample(
                "History Assignment",
                "Write essay about World War II",
                TaskType::Assignment,
                3,
                (23, 59),
            ),
            sample("Physics Class", "Quantum mechanics lecture", TaskType::Class, 0, (14, 30)),
        ];
        self.repo.replace_all(tasks).await?;
        Ok(true)
    }

    async fn sync_reminder(&self, task: Task) -> Result<Task, DomainError> {
        let handle = self.scheduler.arm_with_at(self.mode, &task, (self.clock)()).await;
        if handle == task.notification_id {
            return Ok(task);
        }
        let saved = self
            .repo
            .update(task.id, TaskPatch::notification(handle.clone()))
            .await;
        match saved {
            Ok(Some(task)) => Ok(task),
            Ok(None) => {
                self.scheduler.cancel(handle.as_ref()).await;
                Err(DomainError::TaskNotFound(task.id))
            }
            Err(e) => {
                // The handle is not recorded anywhere, so release the alarm.
                self.scheduler.cancel(handle.as_ref()).await;
                Err(e)
            }
        }
    }
}
