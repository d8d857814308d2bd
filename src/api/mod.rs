use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnalyticsService, AuthService, EquipmentService, MovementService, SeaOrmAuthService,
    SeaOrmEquipmentService, SeaOrmMovementService, SeaOrmUserService, UserService,
};

mod analytics;
pub mod auth;
mod equipment;
mod error;
mod movements;
mod observability;
mod system;
pub mod types;
pub mod validation;
mod users;

pub use error::{ApiError, FieldError};

use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub equipment_service: Arc<dyn EquipmentService>,

    pub movement_service: Arc<dyn MovementService>,

    pub analytics: Arc<AnalyticsService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.user_service
    }

    #[must_use]
    pub fn equipment_service(&self) -> &Arc<dyn EquipmentService> {
        &self.equipment_service
    }

    #[must_use]
    pub fn movement_service(&self) -> &Arc<dyn MovementService> {
        &self.movement_service
    }

    #[must_use]
    pub fn analytics(&self) -> &Arc<AnalyticsService> {
        &self.analytics
    }
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let pruned = store.prune_expired_tokens().await?;
    if pruned > 0 {
        tracing::info!("Pruned {} expired blacklist tokens", pruned);
    }

    let config = Arc::new(RwLock::new(config));

    let auth_service =
        Arc::new(SeaOrmAuthService::new(store.clone(), config.clone())) as Arc<dyn AuthService>;
    let user_service =
        Arc::new(SeaOrmUserService::new(store.clone(), config.clone())) as Arc<dyn UserService>;
    let equipment_service =
        Arc::new(SeaOrmEquipmentService::new(store.clone())) as Arc<dyn EquipmentService>;
    let movement_service =
        Arc::new(SeaOrmMovementService::new(store.clone())) as Arc<dyn MovementService>;
    let analytics = Arc::new(AnalyticsService::new(store.clone()));

    Ok(Arc::new(AppState {
        config,
        store,
        auth_service,
        user_service,
        equipment_service,
        movement_service,
        analytics,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health", get(system::get_health))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/usuarios", post(users::create_user))
        .route("/usuarios", get(users::list_users))
        .route("/usuarios/{id}", get(users::get_user))
        .route("/usuarios/{id}", put(users::update_user))
        .route("/usuarios/{id}", delete(users::deactivate_user))
        .route("/equipamentos", post(equipment::create_equipment))
        .route("/equipamentos", get(equipment::list_equipment))
        .route("/equipamentos/{id}", get(equipment::get_equipment))
        .route("/equipamentos/{id}/historico", get(equipment::get_history))
        .route("/equipamentos/{id}", put(equipment::update_equipment))
        .route("/equipamentos/{id}", delete(equipment::discard_equipment))
        .route("/movimentacoes", post(movements::create_movement))
        .route("/movimentacoes", get(movements::list_movements))
        .route(
            "/movimentacoes/equipamento/{id}",
            get(movements::list_by_equipment),
        )
        .route("/movimentacoes/usuario/{id}", get(movements::list_by_user))
        .route("/analytics/equipamentos", get(analytics::equipment_report))
        .route("/analytics/movimentacoes", get(analytics::movement_report))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
