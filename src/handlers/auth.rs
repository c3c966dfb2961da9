use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::debug;

use crate::middleware::AuthUser;
use crate::router::GeolensState;
use crate::types::{LoginRequest, LoginResponse, MeResponse};
use crate::GeolensError;

/// POST /login -> verifies email + password and returns a session token.
pub async fn login(
    State(state): State<GeolensState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, GeolensError> {
    // An absent or unparseable body is treated as an empty one.
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "login body rejected");
            LoginRequest::default()
        }
    };
    let resp = state.auth.authenticate(&req).await?;
    Ok(Json(resp))
}

/// GET /me -> identity carried by the bearer token.
pub async fn me(AuthUser(claims): AuthUser) -> Json<MeResponse> {
    Json(claims.into())
}
