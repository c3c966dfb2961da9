use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use crate::auth::Claims;
use crate::error::GeolensError;
use crate::router::GeolensState;

/// Identity taken from a valid `Authorization: Bearer <token>` header.
///
/// Rejects with 401 when the header is missing or malformed, the signature does
/// not verify, or the token has expired.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<GeolensState> for AuthUser {
    type Rejection = GeolensError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GeolensState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            parts
                .extract::<TypedHeader<Authorization<Bearer>>>()
                .await
                .map_err(|_| GeolensError::InvalidToken)?;
        let claims = state.auth.verify(bearer.token())?;
        Ok(Self(claims))
    }
}
