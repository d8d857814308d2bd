pub mod prelude;

pub mod equipment;
pub mod equipment_history;
pub mod movements;
pub mod token_blacklist;
pub mod users;
