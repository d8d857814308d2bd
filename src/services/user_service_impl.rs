//! `SeaORM` implementation of the [`UserService`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task;

use crate::api::types::UserDto;
use crate::config::Config;
use crate::db::repositories::user::hash_password;
use crate::db::{NewUser, Page, Store, UserPatch};
use crate::services::user_service::{CreateUser, UpdateUser, UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    async fn hash(&self, password: String) -> Result<String, UserError> {
        let security = self.config.read().await.security.clone();

        // Argon2 hashing is CPU-heavy, keep it off the async runtime
        task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| UserError::Internal(format!("Password hashing task panicked: {e}")))?
            .map_err(UserError::from)
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create(&self, input: CreateUser) -> Result<UserDto, UserError> {
        let password_hash = self.hash(input.password).await?;

        let created = self
            .store
            .create_user(NewUser {
                name: input.name,
                login: input.login,
                password_hash,
                role: input.role.as_str().to_string(),
            })
            .await?
            .ok_or(UserError::DuplicateLogin)?;

        Ok(created.into())
    }

    async fn get(&self, id: i32) -> Result<UserDto, UserError> {
        let user = self.store.get_user(id).await?.ok_or(UserError::NotFound)?;
        Ok(user.into())
    }

    async fn list(&self, page: u64, limit: u64) -> Result<Page<UserDto>, UserError> {
        let users = self.store.list_users(page, limit).await?;
        Ok(users.map(UserDto::from))
    }

    async fn update(&self, id: i32, input: UpdateUser) -> Result<UserDto, UserError> {
        let user = self.store.get_user(id).await?.ok_or(UserError::NotFound)?;

        let password_hash = match input.password {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        let patch = UserPatch {
            name: input.name,
            login: input.login,
            password_hash,
            role: input.role.map(|r| r.as_str().to_string()),
            active: input.active,
        };

        let updated = self
            .store
            .update_user(user, patch)
            .await?
            .ok_or(UserError::DuplicateLogin)?;

        Ok(updated.into())
    }

    async fn deactivate(&self, id: i32) -> Result<(), UserError> {
        if !self.store.deactivate_user(id).await? {
            return Err(UserError::NotFound);
        }
        Ok(())
    }
}
