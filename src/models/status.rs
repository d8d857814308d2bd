//! Equipment lifecycle state machine.
//!
//! Status changes happen only through movement creation or an explicit
//! discard. `DESCARTADO` is terminal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentStatus {
    #[serde(rename = "NO_DEPOSITO")]
    NoDeposito,
    #[serde(rename = "FORA_DEPOSITO")]
    ForaDeposito,
    #[serde(rename = "DESCARTADO")]
    Descartado,
}

impl EquipmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoDeposito => "NO_DEPOSITO",
            Self::ForaDeposito => "FORA_DEPOSITO",
            Self::Descartado => "DESCARTADO",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NO_DEPOSITO" => Some(Self::NoDeposito),
            "FORA_DEPOSITO" => Some(Self::ForaDeposito),
            "DESCARTADO" => Some(Self::Descartado),
            _ => None,
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "ENTRADA")]
    Entrada,
    #[serde(rename = "SAIDA")]
    Saida,
}

impl MovementType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entrada => "ENTRADA",
            Self::Saida => "SAIDA",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ENTRADA" => Some(Self::Entrada),
            "SAIDA" => Some(Self::Saida),
            _ => None,
        }
    }

    /// The status an equipment must hold for this movement to be accepted.
    #[must_use]
    pub const fn required_status(self) -> EquipmentStatus {
        match self {
            Self::Saida => EquipmentStatus::NoDeposito,
            Self::Entrada => EquipmentStatus::ForaDeposito,
        }
    }

    /// The status the equipment transitions to on success.
    #[must_use]
    pub const fn resulting_status(self) -> EquipmentStatus {
        match self {
            Self::Saida => EquipmentStatus::ForaDeposito,
            Self::Entrada => EquipmentStatus::NoDeposito,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Equipment is `DESCARTADO`; no movement may touch it.
    Discarded,
    /// Equipment is not in the status this movement type requires.
    WrongStatus { required: EquipmentStatus },
}

/// Guard + transition for a movement against the current equipment status.
///
/// Returns the new status on success. The discard guard is checked first so a
/// discarded item always yields [`TransitionError::Discarded`], regardless of
/// movement type.
pub fn apply_movement(
    current: EquipmentStatus,
    movement: MovementType,
) -> Result<EquipmentStatus, TransitionError> {
    if current == EquipmentStatus::Descartado {
        return Err(TransitionError::Discarded);
    }

    let required = movement.required_status();
    if current != required {
        return Err(TransitionError::WrongStatus { required });
    }

    Ok(movement.resulting_status())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Cadastro,
    Edicao,
    Descarte,
}

impl HistoryAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cadastro => "CADASTRO",
            Self::Edicao => "EDICAO",
            Self::Descarte => "DESCARTE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "USUARIO")]
    Usuario,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usuario => "USUARIO",
            Self::Admin => "ADMIN",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USUARIO" => Some(Self::Usuario),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}
