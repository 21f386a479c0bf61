use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{hash_password, verify_password};

pub struct AuthService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: UserRepository + ?Sized> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> AuthService<R>
where
    R: UserRepository + ?Sized,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.repo.get().await
    }

    /// Stores a new account, replacing any existing one with a different
    /// email.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        let email = normalize_email(&email);
        if let Some(existing) = self.repo.get().await {
            if existing.email == email {
                return Err(DomainError::UserAlreadyExists(email));
            }
            warn!(previous = %existing.email, "replacing stored account");
        }

        let hash =
            hash_password(&password).map_err(|err| DomainError::Storage(err.to_string()))?;
        let user = User::new(name.trim().to_string(), email, hash);
        self.repo.save(user.clone()).await?;

        info!(email = %user.email, "user registered");
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .repo
            .get()
            .await
            .ok_or(DomainError::InvalidCredentials)?;
        if user.email != normalize_email(email) {
            return Err(DomainError::InvalidCredentials);
        }

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        info!(email = %user.email, "user logged in");
        Ok(user)
    }

    /// Removes the stored account.
    pub async fn logout(&self) -> Result<(), DomainError> {
        self.repo.remove().await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
