//! Entry points a front end calls. Each one validates its input the way
//! the corresponding form does, then delegates to the services.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::application::reminder_scheduler::{ReminderMode, ReminderScheduler};
use crate::application::task_service::{Agenda, TaskService};
use crate::data::kv_store::{FileStore, KeyValueStore, MemoryStore};
use crate::data::task_repository::{KvTaskRepository, TaskRepository};
use crate::data::user_repository::{KvUserRepository, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::task::Task;
use crate::domain::user::User;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::notifications::{
    InMemoryNotificationBackend, NotificationBackend, ScheduledNotification,
    StoredNotificationBackend,
};
use crate::presentation::dto::{LoginRequest, RegisterRequest, TaskEditForm, TaskForm};

#[derive(Clone)]
pub struct Planner {
    auth: AuthService<dyn UserRepository>,
    tasks: TaskService<dyn TaskRepository, dyn NotificationBackend>,
}

impl Planner {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn NotificationBackend>,
        mode: ReminderMode,
    ) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(KvUserRepository::new(Arc::clone(&store)));
        let tasks: Arc<dyn TaskRepository> = Arc::new(KvTaskRepository::new(store));
        Self {
            auth: AuthService::new(users),
            tasks: TaskService::new(tasks, ReminderScheduler::new(backend), mode),
        }
    }

    /// Opens the on-disk store described by `config`. Scheduled reminders
    /// are kept next to the data.
    pub async fn open(config: &AppConfig) -> Result<Self, DomainError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::open(&config.data_dir)
                .await
                .map_err(|e| DomainError::Storage(e.to_string()))?,
        );
        let backend = Arc::new(StoredNotificationBackend::new(Arc::clone(&store)));
        info!(data_dir = %config.data_dir.display(), mode = %config.reminder_mode, "planner opened");
        Ok(Self::new(store, backend, config.reminder_mode))
    }

    pub fn in_memory(mode: ReminderMode) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(InMemoryNotificationBackend::new()),
            mode,
        )
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.tasks = self.tasks.with_clock(clock);
        self
    }

    pub fn tasks(&self) -> &TaskService<dyn TaskRepository, dyn NotificationBackend> {
        &self.tasks
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        request.validate()?;
        self.auth
            .register(request.name, request.email, request.password)
            .await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<User, DomainError> {
        request.validate()?;
        self.auth.login(&request.email, &request.password).await
    }

    pub async fn logout(&self) -> Result<(), DomainError> {
        self.auth.logout().await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.auth.current_user().await
    }

    pub async fn create_task(&self, form: TaskForm) -> Result<Task, DomainError> {
        let fields = form.validate()?;
        self.tasks.create_task(fields).await
    }

    pub async fn edit_task(&self, id: Uuid, form: TaskEditForm) -> Result<Task, DomainError> {
        let patch = form.validate()?;
        self.tasks.edit_task(id, patch).await
    }

    pub async fn complete_toggle(&self, id: Uuid) -> Result<Task, DomainError> {
        self.tasks.toggle_completion(id).await
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<(), DomainError> {
        self.tasks.delete_task(id).await
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.tasks.list_tasks().await
    }

    pub async fn agenda(&self, today: NaiveDate) -> Agenda {
        self.tasks.agenda(today).await
    }

    pub async fn reminders(&self) -> Vec<ScheduledNotification> {
        self.tasks.scheduled_reminders().await
    }

    pub async fn clear_reminders(&self) -> bool {
        self.tasks.cancel_all_reminders().await
    }

    pub async fn seed_sample_data(&self, today: NaiveDate) -> Result<bool, DomainError> {
        self.tasks.seed_sample_data(today).await
    }
}
