use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::db::pagination::{Page, fetch_page};
use crate::entities::{equipment, movements, prelude::*};
use crate::models::{EquipmentStatus, MovementType};

pub struct NewMovement {
    pub equipment_id: i32,
    pub movement_type: MovementType,
    pub user_id: i32,
    pub note: Option<String>,
    pub moved_at: String,
}

#[derive(Default)]
pub struct MovementFilter {
    pub equipment_id: Option<i32>,
    pub movement_type: Option<MovementType>,
    pub user_id: Option<i32>,
    /// Inclusive bounds on `moved_at`, each independently optional.
    pub from: Option<String>,
    pub to: Option<String>,
}

pub struct MovementRepository {
    conn: DatabaseConnection,
}

impl MovementRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Appends the ledger row and flips the equipment status in one
    /// transaction, so no caller can observe the ledger and the status out of
    /// sync.
    pub async fn create_with_transition(
        &self,
        new: NewMovement,
        new_status: EquipmentStatus,
    ) -> Result<movements::Model> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for movement")?;

        let inserted = movements::ActiveModel {
            equipment_id: Set(new.equipment_id),
            movement_type: Set(new.movement_type.as_str().to_string()),
            user_id: Set(new.user_id),
            note: Set(new.note),
            moved_at: Set(new.moved_at),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert movement")?;

        let active = equipment::ActiveModel {
            id: Set(new.equipment_id),
            status: Set(new_status.as_str().to_string()),
            ..Default::default()
        };
        active
            .update(&txn)
            .await
            .context("Failed to update equipment status")?;

        txn.commit().await.context("Failed to commit movement")?;

        Ok(inserted)
    }

    /// Ledger query, always newest first.
    pub async fn list(
        &self,
        filter: MovementFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<movements::Model>> {
        let mut query = Movements::find()
            .order_by_desc(movements::Column::MovedAt)
            .order_by_desc(movements::Column::Id);

        if let Some(equipment_id) = filter.equipment_id {
            query = query.filter(movements::Column::EquipmentId.eq(equipment_id));
        }
        if let Some(movement_type) = filter.movement_type {
            query = query.filter(movements::Column::MovementType.eq(movement_type.as_str()));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(movements::Column::UserId.eq(user_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(movements::Column::MovedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(movements::Column::MovedAt.lte(to));
        }

        fetch_page(query, &self.conn, page, limit)
            .await
            .context("Failed to list movements")
    }

    /// Most recent non-empty note per equipment, for list-view display.
    pub async fn latest_notes(&self, equipment_ids: &[i32]) -> Result<HashMap<i32, String>> {
        if equipment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, Option<String>)> = Movements::find()
            .select_only()
            .column(movements::Column::EquipmentId)
            .column(movements::Column::Note)
            .filter(movements::Column::EquipmentId.is_in(equipment_ids.to_vec()))
            .filter(movements::Column::Note.is_not_null())
            .order_by_desc(movements::Column::MovedAt)
            .order_by_desc(movements::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query latest movement notes")?;

        let mut notes = HashMap::new();
        for (equipment_id, note) in rows {
            if let Some(note) = note {
                notes.entry(equipment_id).or_insert(note);
            }
        }

        Ok(notes)
    }

    /// `(ENTRADA, SAIDA)` totals over an optional inclusive range.
    pub async fn count_by_type(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<(i64, i64)> {
        let mut query = Movements::find()
            .select_only()
            .column(movements::Column::MovementType)
            .column_as(movements::Column::Id.count(), "count")
            .group_by(movements::Column::MovementType);

        if let Some(from) = from {
            query = query.filter(movements::Column::MovedAt.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(movements::Column::MovedAt.lte(to));
        }

        let rows: Vec<(String, i64)> = query
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count movements by type")?;

        let mut entradas = 0;
        let mut saidas = 0;
        for (movement_type, count) in rows {
            match MovementType::parse(&movement_type) {
                Some(MovementType::Entrada) => entradas = count,
                Some(MovementType::Saida) => saidas = count,
                None => {}
            }
        }

        Ok((entradas, saidas))
    }

    /// `(day, type, count)` rows over an optional inclusive range, oldest day
    /// first. The day is the date prefix of the RFC3339 `moved_at`.
    pub async fn count_per_day(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<(String, String, i64)>> {
        let day = Expr::cust("substr(moved_at, 1, 10)");

        let mut query = Movements::find()
            .select_only()
            .expr_as(day.clone(), "day")
            .column(movements::Column::MovementType)
            .column_as(movements::Column::Id.count(), "count")
            .group_by(day.clone())
            .group_by(movements::Column::MovementType)
            .order_by_asc(day);

        if let Some(from) = from {
            query = query.filter(movements::Column::MovedAt.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(movements::Column::MovedAt.lte(to));
        }

        query
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count movements per day")
    }
}
