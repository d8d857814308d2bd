//! `SeaORM` implementation of the [`EquipmentService`] trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::api::types::{EquipmentDto, EquipmentListItemDto, HistoryDto, OwnerDto};
use crate::db::{
    EquipmentFilter, EquipmentPatch, FieldChange, NewEquipment, Page, Store,
};
use crate::services::auth_service::AuthIdentity;
use crate::services::equipment_service::{
    CreateEquipment, EquipmentError, EquipmentListFilter, EquipmentService, UpdateEquipment,
};

pub struct SeaOrmEquipmentService {
    store: Store,
}

impl SeaOrmEquipmentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EquipmentService for SeaOrmEquipmentService {
    async fn create(
        &self,
        input: CreateEquipment,
        actor: &AuthIdentity,
    ) -> Result<EquipmentDto, EquipmentError> {
        self.store
            .get_user(input.owner_id)
            .await?
            .ok_or(EquipmentError::OwnerNotFound)?;

        let created = self
            .store
            .create_equipment(NewEquipment {
                name: input.name,
                model: input.model,
                serial_number: input.serial_number,
                asset_tag: input.asset_tag,
                location: input.location,
                owner_id: input.owner_id,
                actor_id: actor.id,
            })
            .await?
            .ok_or(EquipmentError::DuplicateSerial)?;

        Ok(created.into())
    }

    async fn get(&self, id: i32) -> Result<EquipmentDto, EquipmentError> {
        let equipment = self
            .store
            .get_equipment(id)
            .await?
            .ok_or(EquipmentError::NotFound)?;

        Ok(equipment.into())
    }

    async fn list(
        &self,
        filter: EquipmentListFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<EquipmentListItemDto>, EquipmentError> {
        let created_range = filter.created_date.map(|day| {
            let next = day.succ_opt().unwrap_or(day);
            (format!("{day}T00:00:00"), format!("{next}T00:00:00"))
        });

        let rows = self
            .store
            .list_equipment(
                EquipmentFilter {
                    status: filter.status,
                    user_id: filter.user_id,
                    name: filter.name,
                    model: filter.model,
                    serial_number: filter.serial_number,
                    asset_tag: filter.asset_tag,
                    location: filter.location,
                    created_range,
                    search: filter.search,
                },
                page,
                limit,
            )
            .await?;

        let ids: Vec<i32> = rows.items.iter().map(|e| e.id).collect();
        let notes = self.store.latest_movement_notes(&ids).await?;

        let mut owner_ids: Vec<i32> = rows.items.iter().map(|e| e.user_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<i32, OwnerDto> = self
            .store
            .get_users_by_ids(&owner_ids)
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

        Ok(rows.map(|e| EquipmentListItemDto {
            id: e.id,
            name: e.name,
            model: e.model,
            serial_number: e.serial_number,
            asset_tag: e.asset_tag,
            location: e.location,
            status: e.status,
            created_at: e.created_at,
            last_movement_note: notes.get(&e.id).cloned(),
            user: owners.get(&e.user_id).cloned(),
        }))
    }

    async fn history(&self, id: i32) -> Result<Vec<HistoryDto>, EquipmentError> {
        self.store
            .get_equipment(id)
            .await?
            .ok_or(EquipmentError::NotFound)?;

        let rows = self.store.equipment_history(id).await?;
        Ok(rows.into_iter().map(HistoryDto::from).collect())
    }

    async fn update(
        &self,
        id: i32,
        input: UpdateEquipment,
        actor: &AuthIdentity,
    ) -> Result<EquipmentDto, EquipmentError> {
        let current = self
            .store
            .get_equipment(id)
            .await?
            .ok_or(EquipmentError::NotFound)?;

        let mut patch = EquipmentPatch::default();
        let mut changes = Vec::new();

        if let Some(name) = input.name
            && name != current.name
        {
            changes.push(FieldChange {
                field: "name",
                old_value: Some(current.name.clone()),
                new_value: Some(name.clone()),
            });
            patch.name = Some(name);
        }

        if let Some(model) = input.model
            && model != current.model
        {
            changes.push(FieldChange {
                field: "model",
                old_value: Some(current.model.clone()),
                new_value: Some(model.clone()),
            });
            patch.model = Some(model);
        }

        if let Some(serial) = input.serial_number
            && serial != current.serial_number
        {
            changes.push(FieldChange {
                field: "serial_number",
                old_value: Some(current.serial_number.clone()),
                new_value: Some(serial.clone()),
            });
            patch.serial_number = Some(serial);
        }

        if let Some(tag) = input.asset_tag
            && current.asset_tag.as_deref() != Some(tag.as_str())
        {
            changes.push(FieldChange {
                field: "asset_tag",
                old_value: current.asset_tag.clone(),
                new_value: Some(tag.clone()),
            });
            patch.asset_tag = Some(tag);
        }

        if let Some(location) = input.location
            && current.location.as_deref() != Some(location.as_str())
        {
            changes.push(FieldChange {
                field: "location",
                old_value: current.location.clone(),
                new_value: Some(location.clone()),
            });
            patch.location = Some(location);
        }

        // Editing always reassigns responsibility to the editor
        if actor.id != current.user_id {
            changes.push(FieldChange {
                field: "user_id",
                old_value: Some(current.user_id.to_string()),
                new_value: Some(actor.id.to_string()),
            });
            patch.user_id = Some(actor.id);
        }

        if changes.is_empty() {
            return Ok(current.into());
        }

        let updated = self
            .store
            .update_equipment(current, patch, changes, actor.id)
            .await?
            .ok_or(EquipmentError::DuplicateSerialInUse)?;

        Ok(updated.into())
    }

    async fn discard(
        &self,
        id: i32,
        actor: &AuthIdentity,
    ) -> Result<EquipmentDto, EquipmentError> {
        let current = self
            .store
            .get_equipment(id)
            .await?
            .ok_or(EquipmentError::NotFound)?;

        let discarded = self.store.discard_equipment(current, actor.id).await?;

        Ok(discarded.into())
    }
}
