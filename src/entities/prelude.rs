pub use super::equipment::Entity as Equipment;
pub use super::equipment_history::Entity as EquipmentHistory;
pub use super::movements::Entity as Movements;
pub use super::token_blacklist::Entity as TokenBlacklist;
pub use super::users::Entity as Users;
