use axum::Json;

use crate::types::PingResponse;

/// GET /ping -> liveness check, independent of authentication.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { ok: true })
}
