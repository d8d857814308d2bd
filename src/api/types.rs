use serde::Serialize;

use crate::db::pagination::{Page, PageMeta};
use crate::entities::{equipment, equipment_history, users};

/// List envelope: `{ data: [...], meta: { total, page, ... } }`
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> From<Page<T>> for Paged<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.items,
            meta: page.meta,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// User projection without the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub login: String,
    pub active: i32,
    pub role: String,
    pub created_at: String,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            login: model.login,
            active: model.active,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EquipmentDto {
    pub id: i32,
    pub name: String,
    pub model: String,
    pub serial_number: String,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub user_id: i32,
    pub created_at: String,
}

impl From<equipment::Model> for EquipmentDto {
    fn from(model: equipment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            model: model.model,
            serial_number: model.serial_number,
            asset_tag: model.asset_tag,
            location: model.location,
            status: model.status,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

/// Responsible-user projection embedded in equipment listings
#[derive(Debug, Clone, Serialize)]
pub struct OwnerDto {
    pub id: i32,
    pub name: String,
    pub login: String,
}

/// Equipment row as the list view wants it: the record itself, the note of
/// its most recent movement, and the owner's compact projection.
#[derive(Debug, Serialize)]
pub struct EquipmentListItemDto {
    pub id: i32,
    pub name: String,
    pub model: String,
    pub serial_number: String,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub created_at: String,
    pub last_movement_note: Option<String>,
    pub user: Option<OwnerDto>,
}

#[derive(Debug, Serialize)]
pub struct HistoryDto {
    pub id: i32,
    pub equipment_id: i32,
    pub user_id: i32,
    pub action: String,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: String,
}

impl From<equipment_history::Model> for HistoryDto {
    fn from(model: equipment_history::Model) -> Self {
        Self {
            id: model.id,
            equipment_id: model.equipment_id,
            user_id: model.user_id,
            action: model.action,
            field: model.field,
            old_value: model.old_value,
            new_value: model.new_value,
            created_at: model.created_at,
        }
    }
}

/// Compact equipment projection embedded in ledger listings
#[derive(Debug, Clone, Serialize)]
pub struct MovementEquipmentDto {
    pub id: i32,
    pub name: String,
    pub serial_number: String,
}

#[derive(Debug, Serialize)]
pub struct MovementDto {
    pub id: i32,
    pub movement_type: String,
    pub note: Option<String>,
    pub moved_at: String,
    pub created_at: String,
    pub equipment: Option<MovementEquipmentDto>,
    pub user: Option<OwnerDto>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct EquipmentReport {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Serialize)]
pub struct DailyMovementCount {
    pub date: String,
    pub entradas: i64,
    pub saidas: i64,
}

#[derive(Debug, Serialize)]
pub struct MovementReport {
    pub total: i64,
    pub entradas: i64,
    pub saidas: i64,
    pub per_day: Vec<DailyMovementCount>,
}
