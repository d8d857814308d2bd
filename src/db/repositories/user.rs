use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

use crate::config::SecurityConfig;
use crate::db::pagination::{Page, fetch_page};
use crate::entities::{prelude::*, users};

pub struct NewUser {
    pub name: String,
    pub login: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub login: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub active: Option<i32>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a user. Returns `None` when the login is already taken
    /// (storage-level unique constraint).
    pub async fn create(&self, new: NewUser) -> Result<Option<users::Model>> {
        let active = users::ActiveModel {
            name: Set(new.name),
            login: Set(new.login),
            password_hash: Set(new.password_hash),
            active: Set(1),
            role: Set(new.role),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(None),
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_by_login(&self, login: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.conn)
            .await
            .context("Failed to query user by login")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<users::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Users::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")
    }

    pub async fn list(&self, page: u64, limit: u64) -> Result<Page<users::Model>> {
        let query = Users::find().order_by_asc(users::Column::Id);

        fetch_page(query, &self.conn, page, limit)
            .await
            .context("Failed to list users")
    }

    /// Applies a patch. Returns `None` when a login change collides with
    /// another user's login.
    pub async fn update(
        &self,
        user: users::Model,
        patch: UserPatch,
    ) -> Result<Option<users::Model>> {
        let mut active: users::ActiveModel = user.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(login) = patch.login {
            active.login = Set(login);
        }
        if let Some(hash) = patch.password_hash {
            active.password_hash = Set(hash);
        }
        if let Some(role) = patch.role {
            active.role = Set(role);
        }
        if let Some(flag) = patch.active {
            active.active = Set(flag);
        }

        match active.update(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(None),
            Err(e) => Err(e).context("Failed to update user"),
        }
    }

    /// Soft-deactivates a user. Returns `false` when the id does not exist.
    pub async fn deactivate(&self, id: i32) -> Result<bool> {
        let Some(user) = self.get(id).await? else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.active = Set(0);
        active.update(&self.conn).await.context("Failed to deactivate user")?;

        Ok(true)
    }
}

/// Hash a password using Argon2id with params from [`SecurityConfig`].
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
pub fn verify_password_hash(hash: &str, password: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
