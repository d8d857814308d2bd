use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::db::pagination::{Page, fetch_page};
use crate::entities::{equipment, equipment_history, prelude::*};
use crate::models::{EquipmentStatus, HistoryAction};

pub struct NewEquipment {
    pub name: String,
    pub model: String,
    pub serial_number: String,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub owner_id: i32,
    pub actor_id: i32,
}

#[derive(Default)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub user_id: Option<i32>,
}

/// One changed field, string-coerced for the audit trail.
pub struct FieldChange {
    pub field: &'static str,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

#[derive(Default)]
pub struct EquipmentFilter {
    /// `None` excludes `DESCARTADO`; callers may only set the two
    /// non-terminal statuses.
    pub status: Option<EquipmentStatus>,
    pub user_id: Option<i32>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    /// Half-open `[gte, lt)` bounds on the creation timestamp.
    pub created_range: Option<(String, String)>,
    /// Free-text OR-search across the substring-filterable columns.
    pub search: Option<String>,
}

pub struct EquipmentRepository {
    conn: DatabaseConnection,
}

impl EquipmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts an equipment plus its `CADASTRO` audit row in one transaction.
    /// Status is always `NO_DEPOSITO` on insert. Returns `None` when the
    /// serial number is already taken.
    pub async fn create_with_history(&self, new: NewEquipment) -> Result<Option<equipment::Model>> {
        let now = chrono::Utc::now().to_rfc3339();

        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for equipment insert")?;

        let active = equipment::ActiveModel {
            name: Set(new.name),
            model: Set(new.model),
            serial_number: Set(new.serial_number),
            asset_tag: Set(new.asset_tag),
            location: Set(new.location),
            status: Set(EquipmentStatus::NoDeposito.as_str().to_string()),
            user_id: Set(new.owner_id),
            created_at: Set(now.clone()),
            ..Default::default()
        };

        let inserted = match active.insert(&txn).await {
            Ok(model) => model,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to insert equipment"),
        };

        equipment_history::ActiveModel {
            equipment_id: Set(inserted.id),
            user_id: Set(new.actor_id),
            action: Set(HistoryAction::Cadastro.as_str().to_string()),
            field: Set(None),
            old_value: Set(None),
            new_value: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert registration history")?;

        txn.commit()
            .await
            .context("Failed to commit equipment insert")?;

        Ok(Some(inserted))
    }

    pub async fn get(&self, id: i32) -> Result<Option<equipment::Model>> {
        Equipment::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query equipment by ID")
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<equipment::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Equipment::find()
            .filter(equipment::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query equipment by IDs")
    }

    pub async fn list(
        &self,
        filter: EquipmentFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<equipment::Model>> {
        let mut query = Equipment::find().order_by_desc(equipment::Column::CreatedAt);

        query = match filter.status {
            Some(status) => query.filter(equipment::Column::Status.eq(status.as_str())),
            None => {
                query.filter(equipment::Column::Status.ne(EquipmentStatus::Descartado.as_str()))
            }
        };

        if let Some(user_id) = filter.user_id {
            query = query.filter(equipment::Column::UserId.eq(user_id));
        }
        if let Some(name) = filter.name {
            query = query.filter(equipment::Column::Name.contains(name));
        }
        if let Some(model) = filter.model {
            query = query.filter(equipment::Column::Model.contains(model));
        }
        if let Some(serial) = filter.serial_number {
            query = query.filter(equipment::Column::SerialNumber.contains(serial));
        }
        if let Some(tag) = filter.asset_tag {
            query = query.filter(equipment::Column::AssetTag.contains(tag));
        }
        if let Some(location) = filter.location {
            query = query.filter(equipment::Column::Location.contains(location));
        }
        if let Some((start, end)) = filter.created_range {
            query = query
                .filter(equipment::Column::CreatedAt.gte(start))
                .filter(equipment::Column::CreatedAt.lt(end));
        }
        if let Some(term) = filter.search {
            query = query.filter(
                Condition::any()
                    .add(equipment::Column::Name.contains(term.as_str()))
                    .add(equipment::Column::Model.contains(term.as_str()))
                    .add(equipment::Column::SerialNumber.contains(term.as_str()))
                    .add(equipment::Column::AssetTag.contains(term.as_str()))
                    .add(equipment::Column::Location.contains(term.as_str())),
            );
        }

        fetch_page(query, &self.conn, page, limit)
            .await
            .context("Failed to list equipment")
    }

    /// Applies a patch plus one `EDICAO` audit row per changed field, all in
    /// one transaction. Returns `None` when a serial change collides with
    /// another record.
    pub async fn update_with_history(
        &self,
        current: equipment::Model,
        patch: EquipmentPatch,
        changes: Vec<FieldChange>,
        actor_id: i32,
    ) -> Result<Option<equipment::Model>> {
        let now = chrono::Utc::now().to_rfc3339();
        let equipment_id = current.id;

        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for equipment update")?;

        let mut active: equipment::ActiveModel = current.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(model) = patch.model {
            active.model = Set(model);
        }
        if let Some(serial) = patch.serial_number {
            active.serial_number = Set(serial);
        }
        if let Some(tag) = patch.asset_tag {
            active.asset_tag = Set(Some(tag));
        }
        if let Some(location) = patch.location {
            active.location = Set(Some(location));
        }
        if let Some(user_id) = patch.user_id {
            active.user_id = Set(user_id);
        }

        let updated = match active.update(&txn).await {
            Ok(model) => model,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to update equipment"),
        };

        for change in changes {
            equipment_history::ActiveModel {
                equipment_id: Set(equipment_id),
                user_id: Set(actor_id),
                action: Set(HistoryAction::Edicao.as_str().to_string()),
                field: Set(Some(change.field.to_string())),
                old_value: Set(change.old_value),
                new_value: Set(change.new_value),
                created_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to insert edit history")?;
        }

        txn.commit()
            .await
            .context("Failed to commit equipment update")?;

        Ok(Some(updated))
    }

    /// Flips status to `DESCARTADO` and records the `DESCARTE` audit row in
    /// one transaction. Unconditional; the movement path is what guards
    /// against touching discarded items.
    pub async fn discard_with_history(
        &self,
        current: equipment::Model,
        actor_id: i32,
    ) -> Result<equipment::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let equipment_id = current.id;
        let old_status = current.status.clone();

        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for equipment discard")?;

        let mut active: equipment::ActiveModel = current.into();
        active.status = Set(EquipmentStatus::Descartado.as_str().to_string());
        let updated = active
            .update(&txn)
            .await
            .context("Failed to discard equipment")?;

        equipment_history::ActiveModel {
            equipment_id: Set(equipment_id),
            user_id: Set(actor_id),
            action: Set(HistoryAction::Descarte.as_str().to_string()),
            field: Set(Some("status".to_string())),
            old_value: Set(Some(old_status)),
            new_value: Set(Some(EquipmentStatus::Descartado.as_str().to_string())),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert discard history")?;

        txn.commit()
            .await
            .context("Failed to commit equipment discard")?;

        Ok(updated)
    }

    /// Audit trail for one equipment, newest first.
    pub async fn history(&self, equipment_id: i32) -> Result<Vec<equipment_history::Model>> {
        EquipmentHistory::find()
            .filter(equipment_history::Column::EquipmentId.eq(equipment_id))
            .order_by_desc(equipment_history::Column::CreatedAt)
            .order_by_desc(equipment_history::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query equipment history")
    }

    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>> {
        Equipment::find()
            .select_only()
            .column(equipment::Column::Status)
            .column_as(equipment::Column::Id.count(), "count")
            .group_by(equipment::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count equipment by status")
    }
}
