//! Domain service for staff users. "Deleting" a user is a soft toggle of the
//! active flag; rows are never removed.

use thiserror::Error;

use crate::api::types::UserDto;
use crate::db::Page;
use crate::models::UserRole;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Usuário não encontrado")]
    NotFound,

    #[error("Login já cadastrado")]
    DuplicateLogin,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "USER_NOT_FOUND",
            Self::DuplicateLogin => "LOGIN_TAKEN",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Validated create input.
pub struct CreateUser {
    pub name: String,
    pub login: String,
    pub password: String,
    pub role: UserRole,
}

/// Validated update input; `None` fields stay untouched.
#[derive(Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<i32>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::DuplicateLogin`] when the login is taken.
    async fn create(&self, input: CreateUser) -> Result<UserDto, UserError>;

    async fn get(&self, id: i32) -> Result<UserDto, UserError>;

    async fn list(&self, page: u64, limit: u64) -> Result<Page<UserDto>, UserError>;

    async fn update(&self, id: i32, input: UpdateUser) -> Result<UserDto, UserError>;

    /// Soft-deactivates; the row stays for referential integrity of the
    /// ledger and audit trail.
    async fn deactivate(&self, id: i32) -> Result<(), UserError>;
}
