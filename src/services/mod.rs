pub mod auth_service;
pub use auth_service::{AuthError, AuthIdentity, AuthService, LoginSuccess};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub use user_service::{CreateUser, UpdateUser, UserError, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;

pub mod equipment_service;
pub use equipment_service::{
    CreateEquipment, EquipmentError, EquipmentListFilter, EquipmentService, UpdateEquipment,
};

pub mod equipment_service_impl;
pub use equipment_service_impl::SeaOrmEquipmentService;

pub mod movement_service;
pub use movement_service::{
    CreateMovement, MovementError, MovementListFilter, MovementService,
};

pub mod movement_service_impl;
pub use movement_service_impl::SeaOrmMovementService;

pub mod analytics_service;
pub use analytics_service::AnalyticsService;
