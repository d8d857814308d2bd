use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

use crate::entities::{prelude::*, token_blacklist};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a revoked token. Revoking the same token twice is a no-op.
    pub async fn blacklist(&self, token: &str, expires_at: &str) -> Result<()> {
        let active = token_blacklist::ActiveModel {
            token: Set(token.to_string()),
            expires_at: Set(expires_at.to_string()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(()),
            Err(e) => Err(e).context("Failed to insert blacklisted token"),
        }
    }

    pub async fn is_blacklisted(&self, token: &str) -> Result<bool> {
        let found = TokenBlacklist::find()
            .filter(token_blacklist::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query token blacklist")?;

        Ok(found.is_some())
    }

    /// Deletes rows whose expiry has passed; stale entries never match a live
    /// token anyway, this only bounds table growth.
    pub async fn prune_expired(&self, now: &str) -> Result<u64> {
        let result = TokenBlacklist::delete_many()
            .filter(token_blacklist::Column::ExpiresAt.lt(now))
            .exec(&self.conn)
            .await
            .context("Failed to prune expired tokens")?;

        Ok(result.rows_affected)
    }
}
