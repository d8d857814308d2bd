//! `SeaORM` implementation of the [`MovementService`] trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::api::types::{MovementDto, MovementEquipmentDto, OwnerDto};
use crate::db::{MovementFilter, NewMovement, Page, Store};
use crate::entities::movements;
use crate::models::{EquipmentStatus, TransitionError, apply_movement};
use crate::services::movement_service::{
    CreateMovement, MovementError, MovementListFilter, MovementService,
};

pub struct SeaOrmMovementService {
    store: Store,
}

impl SeaOrmMovementService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Expands a page of ledger rows with their equipment and user
    /// projections, batch-loaded once per page.
    async fn hydrate(
        &self,
        rows: Page<movements::Model>,
    ) -> Result<Page<MovementDto>, MovementError> {
        let mut equipment_ids: Vec<i32> = rows.items.iter().map(|m| m.equipment_id).collect();
        equipment_ids.sort_unstable();
        equipment_ids.dedup();

        let mut user_ids: Vec<i32> = rows.items.iter().map(|m| m.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let equipment: HashMap<i32, MovementEquipmentDto> = self
            .store
            .get_equipment_by_ids(&equipment_ids)
            .await?
            .into_iter()
            .map(|e| {
                (
                    e.id,
                    MovementEquipmentDto {
                        id: e.id,
                        name: e.name,
                        serial_number: e.serial_number,
                    },
                )
            })
            .collect();

        let users: HashMap<i32, OwnerDto> = self
            .store
            .get_users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    OwnerDto {
                        id: u.id,
                        name: u.name,
                        login: u.login,
                    },
                )
            })
            .collect();

        Ok(rows.map(|m| MovementDto {
            id: m.id,
            movement_type: m.movement_type,
            note: m.note,
            moved_at: m.moved_at,
            created_at: m.created_at,
            equipment: equipment.get(&m.equipment_id).cloned(),
            user: users.get(&m.user_id).cloned(),
        }))
    }
}

#[async_trait]
impl MovementService for SeaOrmMovementService {
    async fn create(&self, input: CreateMovement) -> Result<MovementDto, MovementError> {
        let equipment = self
            .store
            .get_equipment(input.equipment_id)
            .await?
            .ok_or(MovementError::EquipmentNotFound)?;

        let user = self
            .store
            .get_user(input.user_id)
            .await?
            .ok_or(MovementError::UserNotFound)?;

        let current = EquipmentStatus::parse(&equipment.status).ok_or_else(|| {
            MovementError::Internal(format!("Unknown equipment status: {}", equipment.status))
        })?;

        let new_status =
            apply_movement(current, input.movement_type).map_err(|e| match e {
                TransitionError::Discarded => MovementError::EquipmentDiscarded,
                TransitionError::WrongStatus { required } => MovementError::WrongStatus {
                    movement: input.movement_type,
                    required,
                },
            })?;

        let note = input
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let moved_at = input
            .moved_at
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let created = self
            .store
            .create_movement(
                NewMovement {
                    equipment_id: equipment.id,
                    movement_type: input.movement_type,
                    user_id: user.id,
                    note,
                    moved_at,
                },
                new_status,
            )
            .await?;

        Ok(MovementDto {
            id: created.id,
            movement_type: created.movement_type,
            note: created.note,
            moved_at: created.moved_at,
            created_at: created.created_at,
            equipment: Some(MovementEquipmentDto {
                id: equipment.id,
                name: equipment.name,
                serial_number: equipment.serial_number,
            }),
            user: Some(OwnerDto {
                id: user.id,
                name: user.name,
                login: user.login,
            }),
        })
    }

    async fn list(
        &self,
        filter: MovementListFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<MovementDto>, MovementError> {
        let rows = self
            .store
            .list_movements(
                MovementFilter {
                    equipment_id: filter.equipment_id,
                    movement_type: filter.movement_type,
                    user_id: filter.user_id,
                    from: filter.from,
                    to: filter.to,
                },
                page,
                limit,
            )
            .await?;

        self.hydrate(rows).await
    }

    async fn list_by_equipment(
        &self,
        equipment_id: i32,
        page: u64,
        limit: u64,
    ) -> Result<Page<MovementDto>, MovementError> {
        self.store
            .get_equipment(equipment_id)
            .await?
            .ok_or(MovementError::EquipmentNotFound)?;

        let rows = self
            .store
            .list_movements(
                MovementFilter {
                    equipment_id: Some(equipment_id),
                    ..Default::default()
                },
                page,
                limit,
            )
            .await?;

        self.hydrate(rows).await
    }

    async fn list_by_user(
        &self,
        user_id: i32,
        page: u64,
        limit: u64,
    ) -> Result<Page<MovementDto>, MovementError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(MovementError::UserNotFound)?;

        let rows = self
            .store
            .list_movements(
                MovementFilter {
                    user_id: Some(user_id),
                    ..Default::default()
                },
                page,
                limit,
            )
            .await?;

        self.hydrate(rows).await
    }
}
