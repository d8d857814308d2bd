//! Domain service for equipment records: registration, editing with a
//! per-field audit trail, terminal discard, and the filtered list view.
//!
//! Status is never set directly through this service; movements own the
//! `NO_DEPOSITO`/`FORA_DEPOSITO` transitions, discard is the only other exit.

use thiserror::Error;

use crate::api::types::{EquipmentDto, EquipmentListItemDto, HistoryDto};
use crate::db::Page;
use crate::models::EquipmentStatus;
use crate::services::auth_service::AuthIdentity;

#[derive(Debug, Error)]
pub enum EquipmentError {
    #[error("Equipamento não encontrado")]
    NotFound,

    /// Owning user reference does not resolve — a not-found, not a
    /// validation failure.
    #[error("Usuário não encontrado")]
    OwnerNotFound,

    #[error("Número de série já cadastrado")]
    DuplicateSerial,

    /// Update-path variant: the serial exists on a different record.
    #[error("Número de série já cadastrado em outro equipamento")]
    DuplicateSerialInUse,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EquipmentError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "EQUIPMENT_NOT_FOUND",
            Self::OwnerNotFound => "USER_NOT_FOUND",
            Self::DuplicateSerial => "SERIAL_TAKEN",
            Self::DuplicateSerialInUse => "SERIAL_TAKEN_OTHER",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<sea_orm::DbErr> for EquipmentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EquipmentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Validated create input. Caller-supplied status is ignored by design;
/// everything registers as `NO_DEPOSITO`.
pub struct CreateEquipment {
    pub name: String,
    pub model: String,
    pub serial_number: String,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub owner_id: i32,
}

/// Validated update input; `None` fields stay untouched. The responsible
/// user is not part of the payload — it is always reassigned to the editor.
#[derive(Default)]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
}

/// Validated list filters.
#[derive(Default)]
pub struct EquipmentListFilter {
    /// Restricted to the two non-terminal statuses; `None` means "everything
    /// except `DESCARTADO`".
    pub status: Option<EquipmentStatus>,
    pub user_id: Option<i32>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    /// Same-day filter on the creation date.
    pub created_date: Option<chrono::NaiveDate>,
    pub search: Option<String>,
}

#[async_trait::async_trait]
pub trait EquipmentService: Send + Sync {
    /// Registers an equipment, recording the `CADASTRO` audit entry.
    ///
    /// # Errors
    ///
    /// [`EquipmentError::OwnerNotFound`] when the owning user id does not
    /// resolve, [`EquipmentError::DuplicateSerial`] on a taken serial.
    async fn create(
        &self,
        input: CreateEquipment,
        actor: &AuthIdentity,
    ) -> Result<EquipmentDto, EquipmentError>;

    async fn get(&self, id: i32) -> Result<EquipmentDto, EquipmentError>;

    /// Filtered page, `DESCARTADO` excluded unless a status is asked for,
    /// each row carrying its latest movement note and owner projection.
    async fn list(
        &self,
        filter: EquipmentListFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<EquipmentListItemDto>, EquipmentError>;

    /// Audit trail, newest first.
    async fn history(&self, id: i32) -> Result<Vec<HistoryDto>, EquipmentError>;

    /// Applies a field-by-field diff, writing one `EDICAO` audit row per
    /// changed field, and reassigns the responsible user to the editor.
    async fn update(
        &self,
        id: i32,
        input: UpdateEquipment,
        actor: &AuthIdentity,
    ) -> Result<EquipmentDto, EquipmentError>;

    /// Terminal retirement. Idempotent at this layer; only the movement path
    /// guards against touching discarded items.
    async fn discard(&self, id: i32, actor: &AuthIdentity)
    -> Result<EquipmentDto, EquipmentError>;
}
