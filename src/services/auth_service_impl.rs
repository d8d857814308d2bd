//! JWT implementation of the [`AuthService`] trait over `SeaORM` storage.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task;

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::user::verify_password_hash;
use crate::services::auth_service::{AuthError, AuthIdentity, AuthService, LoginSuccess};

/// Token payload: subject id plus the display fields downstream handlers use.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    login: String,
    name: String,
    iat: i64,
    exp: i64,
}

pub struct SeaOrmAuthService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, login: &str, password: &str) -> Result<LoginSuccess, AuthError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self
            .store
            .get_user_by_login(login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // The activity check runs before password comparison: a disabled
        // account discloses its state even on a correct password, the
        // password itself is never confirmed.
        if user.active != 1 {
            return Err(AuthError::Deactivated);
        }

        let hash = user.password_hash.clone();
        let candidate = password.to_string();

        // Argon2 verification is CPU-heavy, keep it off the async runtime
        let is_valid = task::spawn_blocking(move || verify_password_hash(&hash, &candidate))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task panicked: {e}")))??;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let (secret, ttl_hours) = {
            let config = self.config.read().await;
            (config.auth.jwt_secret.clone(), config.auth.token_ttl_hours)
        };

        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            login: user.login.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(ttl_hours)).timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))?;

        Ok(LoginSuccess {
            token,
            user: AuthIdentity {
                id: user.id,
                login: user.login,
                name: user.name,
            },
        })
    }

    async fn verify_token(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        // Revocation wins over everything: a blacklisted token is rejected
        // exactly like a forged one, before any signature work.
        if self.store.is_token_blacklisted(token).await? {
            return Err(AuthError::InvalidToken);
        }

        let secret = self.config.read().await.auth.jwt_secret.clone();

        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        let id = data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthIdentity {
            id,
            login: data.claims.login,
            name: data.claims.name,
        })
    }

    async fn blacklist_token(&self, token: &str) -> Result<(), AuthError> {
        // Decode without verifying: revocation must also swallow tokens we
        // would no longer accept. Undecodable input is a no-op.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;

        let Ok(data) =
            jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        else {
            return Ok(());
        };

        let expires_at = chrono::DateTime::from_timestamp(data.claims.exp, 0)
            .map_or_else(|| chrono::Utc::now().to_rfc3339(), |dt| dt.to_rfc3339());

        self.store.blacklist_token(token, &expires_at).await?;

        Ok(())
    }
}
