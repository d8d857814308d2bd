//! Domain service for the movement ledger.
//!
//! Every accepted movement appends exactly one ledger row and flips the
//! equipment status in the same transaction; rejected movements write
//! nothing. The ledger itself is append-only.

use thiserror::Error;

use crate::api::types::MovementDto;
use crate::db::Page;
use crate::models::{EquipmentStatus, MovementType};

#[derive(Debug, Error)]
pub enum MovementError {
    #[error("Equipamento não encontrado")]
    EquipmentNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Não é possível movimentar um equipamento descartado")]
    EquipmentDiscarded,

    /// The guard names the status the movement type requires.
    #[error("Movimentação de {movement} exige equipamento {required}")]
    WrongStatus {
        movement: MovementType,
        required: EquipmentStatus,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MovementError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EquipmentNotFound => "EQUIPMENT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EquipmentDiscarded => "EQUIPMENT_DISCARDED",
            Self::WrongStatus { .. } => "INVALID_TRANSITION",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<sea_orm::DbErr> for MovementError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for MovementError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Validated create input. `moved_at` is an RFC3339 timestamp and may be
/// backdated; `None` means "now".
pub struct CreateMovement {
    pub equipment_id: i32,
    pub movement_type: MovementType,
    pub user_id: i32,
    pub note: Option<String>,
    pub moved_at: Option<String>,
}

/// Validated ledger filters; bounds are inclusive and independently optional.
#[derive(Default)]
pub struct MovementListFilter {
    pub equipment_id: Option<i32>,
    pub movement_type: Option<MovementType>,
    pub user_id: Option<i32>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[async_trait::async_trait]
pub trait MovementService: Send + Sync {
    /// Runs the status guard, appends the ledger row and transitions the
    /// equipment, atomically.
    ///
    /// # Errors
    ///
    /// [`MovementError::EquipmentDiscarded`] for any movement against a
    /// discarded item, [`MovementError::WrongStatus`] when the current status
    /// does not match what the movement type requires.
    async fn create(&self, input: CreateMovement) -> Result<MovementDto, MovementError>;

    /// Ledger page, newest first, with compact equipment/user projections.
    async fn list(
        &self,
        filter: MovementListFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<MovementDto>, MovementError>;

    /// Ledger page for one equipment; fails when the equipment is unknown.
    async fn list_by_equipment(
        &self,
        equipment_id: i32,
        page: u64,
        limit: u64,
    ) -> Result<Page<MovementDto>, MovementError>;

    /// Ledger page for one acting user; fails when the user is unknown.
    async fn list_by_user(
        &self,
        user_id: i32,
        page: u64,
        limit: u64,
    ) -> Result<Page<MovementDto>, MovementError>;
}
