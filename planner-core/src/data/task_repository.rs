use std::sync::Arc;

use crate::data::kv_store::{KeyValueStore, TASKS_KEY, read_json, write_json};
use crate::domain::error::DomainError;
use crate::domain::task::{NewTask, Task, TaskPatch};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All stored tasks, failing on an unreadable collection. Mutations
    /// start from this so a bad read never overwrites stored data.
    async fn load(&self) -> Result<Vec<Task>, DomainError>;
    async fn create(&self, fields: NewTask) -> Result<Task, DomainError>;
    /// `Ok(None)` when no task has the given id.
    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Option<Task>, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    async fn replace_all(&self, tasks: Vec<Task>) -> Result<(), DomainError>;

    /// All stored tasks. Read failures are logged and yield an empty list.
    async fn list_all(&self) -> Vec<Task> {
        self.load().await.unwrap_or_default()
    }

    async fn find_by_id(&self, id: Uuid) -> Option<Task> {
        self.list_all().await.into_iter().find(|t| t.id == id)
    }
}

/// Stores the whole task collection under a single key. Every mutation
/// rewrites the full collection, so the last writer wins.
#[derive(Clone)]
pub struct KvTaskRepository<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
}

impl<S: KeyValueStore + ?Sized> KvTaskRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn persist(&self, tasks: &[Task]) -> Result<(), DomainError> {
        write_json(self.store.as_ref(), TASKS_KEY, tasks)
            .await
            .map_err(|e| {
                error!("failed to save tasks: {}", e);
                DomainError::Storage(e.to_string())
            })
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> TaskRepository for KvTaskRepository<S> {
    async fn load(&self) -> Result<Vec<Task>, DomainError> {
        read_json::<Vec<Task>, S>(self.store.as_ref(), TASKS_KEY)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| {
                error!("failed to read tasks: {}", e);
                DomainError::Storage(e.to_string())
            })
    }

    async fn create(&self, fields: NewTask) -> Result<Task, DomainError> {
        let mut tasks = self.load().await?;
        let task = Task::new(fields);
        tasks.push(task.clone());
        self.persist(&tasks).await?;

        info!(task_id = %task.id, title = %task.title, "task created");
        Ok(task)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Option<Task>, DomainError> {
        let mut tasks = self.load().await?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.apply(patch);
        let updated = task.clone();
        self.persist(&tasks).await?;

        info!(task_id = %id, "task updated");
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tasks = self.load().await?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        self.persist(&tasks).await?;

        info!(task_id = %id, removed = before - tasks.len(), "task deleted");
        Ok(())
    }

    async fn replace_all(&self, tasks: Vec<Task>) -> Result<(), DomainError> {
        self.persist(&tasks).await?;
        info!(count = tasks.len(), "task collection replaced");
        Ok(())
    }
}
