pub mod status;

pub use status::{
    EquipmentStatus, HistoryAction, MovementType, TransitionError, UserRole, apply_movement,
};
