use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{equipment, equipment_history, movements, users};
use crate::models::EquipmentStatus;

pub mod migrator;
pub mod pagination;
pub mod repositories;

pub use pagination::{Page, PageMeta};
pub use repositories::equipment::{
    EquipmentFilter, EquipmentPatch, FieldChange, NewEquipment,
};
pub use repositories::movement::{MovementFilter, NewMovement};
pub use repositories::user::{NewUser, UserPatch};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn equipment_repo(&self) -> repositories::equipment::EquipmentRepository {
        repositories::equipment::EquipmentRepository::new(self.conn.clone())
    }

    fn movement_repo(&self) -> repositories::movement::MovementRepository {
        repositories::movement::MovementRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, new: NewUser) -> Result<Option<users::Model>> {
        self.user_repo().create(new).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get(id).await
    }

    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_login(login).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<users::Model>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn list_users(&self, page: u64, limit: u64) -> Result<Page<users::Model>> {
        self.user_repo().list(page, limit).await
    }

    pub async fn update_user(
        &self,
        user: users::Model,
        patch: UserPatch,
    ) -> Result<Option<users::Model>> {
        self.user_repo().update(user, patch).await
    }

    pub async fn deactivate_user(&self, id: i32) -> Result<bool> {
        self.user_repo().deactivate(id).await
    }

    // Equipment

    pub async fn create_equipment(&self, new: NewEquipment) -> Result<Option<equipment::Model>> {
        self.equipment_repo().create_with_history(new).await
    }

    pub async fn get_equipment(&self, id: i32) -> Result<Option<equipment::Model>> {
        self.equipment_repo().get(id).await
    }

    pub async fn get_equipment_by_ids(&self, ids: &[i32]) -> Result<Vec<equipment::Model>> {
        self.equipment_repo().get_by_ids(ids).await
    }

    pub async fn list_equipment(
        &self,
        filter: EquipmentFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<equipment::Model>> {
        self.equipment_repo().list(filter, page, limit).await
    }

    pub async fn update_equipment(
        &self,
        current: equipment::Model,
        patch: EquipmentPatch,
        changes: Vec<FieldChange>,
        actor_id: i32,
    ) -> Result<Option<equipment::Model>> {
        self.equipment_repo()
            .update_with_history(current, patch, changes, actor_id)
            .await
    }

    pub async fn discard_equipment(
        &self,
        current: equipment::Model,
        actor_id: i32,
    ) -> Result<equipment::Model> {
        self.equipment_repo()
            .discard_with_history(current, actor_id)
            .await
    }

    pub async fn equipment_history(
        &self,
        equipment_id: i32,
    ) -> Result<Vec<equipment_history::Model>> {
        self.equipment_repo().history(equipment_id).await
    }

    pub async fn count_equipment_by_status(&self) -> Result<Vec<(String, i64)>> {
        self.equipment_repo().count_by_status().await
    }

    // Movements

    pub async fn create_movement(
        &self,
        new: NewMovement,
        new_status: EquipmentStatus,
    ) -> Result<movements::Model> {
        self.movement_repo()
            .create_with_transition(new, new_status)
            .await
    }

    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<movements::Model>> {
        self.movement_repo().list(filter, page, limit).await
    }

    pub async fn latest_movement_notes(
        &self,
        equipment_ids: &[i32],
    ) -> Result<HashMap<i32, String>> {
        self.movement_repo().latest_notes(equipment_ids).await
    }

    pub async fn count_movements_by_type(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<(i64, i64)> {
        self.movement_repo().count_by_type(from, to).await
    }

    pub async fn count_movements_per_day(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<(String, String, i64)>> {
        self.movement_repo().count_per_day(from, to).await
    }

    // Token blacklist

    pub async fn blacklist_token(&self, token: &str, expires_at: &str) -> Result<()> {
        self.token_repo().blacklist(token, expires_at).await
    }

    pub async fn is_token_blacklisted(&self, token: &str) -> Result<bool> {
        self.token_repo().is_blacklisted(token).await
    }

    pub async fn prune_expired_tokens(&self) -> Result<u64> {
        let now = chrono::Utc::now().to_rfc3339();
        self.token_repo().prune_expired(&now).await
    }
}
