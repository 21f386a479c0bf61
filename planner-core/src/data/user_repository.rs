use std::sync::Arc;

use crate::data::kv_store::{KeyValueStore, USER_KEY, read_json, write_json};
use crate::domain::error::DomainError;
use crate::domain::user::User;
use async_trait::async_trait;
use tracing::{error, info};

/// Single-slot account storage. `save` overwrites whatever is there.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: User) -> Result<(), DomainError>;
    async fn get(&self) -> Option<User>;
    async fn remove(&self) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct KvUserRepository<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
}

impl<S: KeyValueStore + ?Sized> KvUserRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> UserRepository for KvUserRepository<S> {
    async fn save(&self, user: User) -> Result<(), DomainError> {
        write_json(self.store.as_ref(), USER_KEY, &user)
            .await
            .map_err(|e| {
                error!("failed to save user: {}", e);
                DomainError::Storage(e.to_string())
            })?;

        info!(email = %user.email, "user saved");
        Ok(())
    }

    async fn get(&self) -> Option<User> {
        read_json::<User, S>(self.store.as_ref(), USER_KEY)
            .await
            .unwrap_or_else(|e| {
                error!("failed to read user: {}", e);
                None
            })
    }

    async fn remove(&self) -> Result<(), DomainError> {
        self.store.remove(USER_KEY).await.map_err(|e| {
            error!("failed to remove user: {}", e);
            DomainError::Storage(e.to_string())
        })?;

        info!("user removed");
        Ok(())
    }
}
