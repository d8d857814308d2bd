//! Domain service for authentication.
//!
//! Handles login, token verification and token revocation. The revocation
//! list is checked before signature verification, so a revoked token is
//! indistinguishable from a forged one.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Generic missing-credentials rejection, deliberately not field-specific.
    #[error("Login e senha são obrigatórios")]
    MissingCredentials,

    /// Same text for unknown login and wrong password, so callers cannot
    /// enumerate accounts.
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Usuário desativado")]
    Deactivated,

    #[error("Token não fornecido")]
    TokenMissing,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Token expirado")]
    ExpiredToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code for API consumers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "CREDENTIALS_REQUIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Deactivated => "USER_DEACTIVATED",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::InvalidToken => "TOKEN_INVALID",
            Self::ExpiredToken => "TOKEN_EXPIRED",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Minimal identity carried through request extensions after the auth
/// middleware accepts a token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthIdentity {
    pub id: i32,
    pub login: String,
    pub name: String,
}

/// Successful login: the signed token plus the identity it names.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSuccess {
    pub token: String,
    pub user: AuthIdentity,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a signed token.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] for unknown login or wrong password,
    /// [`AuthError::Deactivated`] when the account exists but is inactive.
    async fn login(&self, login: &str, password: &str) -> Result<LoginSuccess, AuthError>;

    /// Validates a token: revocation list first, then signature and expiry.
    async fn verify_token(&self, token: &str) -> Result<AuthIdentity, AuthError>;

    /// Revokes a token. Malformed tokens are silently ignored.
    async fn blacklist_token(&self, token: &str) -> Result<(), AuthError>;
}
