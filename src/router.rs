use crate::auth::TokenSigner;
use crate::config::Config;
use crate::db::UsersStorage;
use crate::handlers::{auth, health};
use crate::service::AuthService;
use axum::{
    Router,
    routing::{get, post},
};
use chrono::Duration;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct GeolensState {
    pub auth: AuthService<UsersStorage>,
}

impl GeolensState {
    pub fn new(storage: UsersStorage, cfg: &Config) -> Self {
        let signer = TokenSigner::new(&cfg.jwt_secret, Duration::hours(cfg.token_ttl_hours));
        Self {
            auth: AuthService::new(storage, signer),
        }
    }
}

/// Routes are served both at the root and under `/api`.
pub fn geolens_router(state: GeolensState) -> Router {
    let routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/ping", get(health::ping));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
