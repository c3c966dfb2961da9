use crate::auth::{Claims, TokenSigner, verify_password};
use crate::db::{PublicUser, UserStore};
use crate::error::GeolensError;
use crate::types::{LoginRequest, LoginResponse};
use tracing::{info, warn};

/// Verifies credentials against a [`UserStore`] and issues session tokens.
#[derive(Clone)]
pub struct AuthService<S> {
    store: S,
    signer: TokenSigner,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(store: S, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    /// Check email + password and, on success, return a signed token with the public user fields.
    pub async fn authenticate(&self, req: &LoginRequest) -> Result<LoginResponse, GeolensError> {
        let (email, password) = match (non_empty(&req.email), non_empty(&req.password)) {
            (Some(e), Some(p)) => (e, p),
            _ => return Err(GeolensError::validation("Email and password required")),
        };

        let Some(user) = self.store.find_by_email(email).await? else {
            warn!("login rejected: unknown email");
            return Err(GeolensError::InvalidCredentials);
        };

        let matches = verify_password(password, &user.password).unwrap_or_else(|e| {
            warn!(user_id = user.id, error = %e, "stored password hash is unusable");
            false
        });
        if !matches {
            warn!(user_id = user.id, "login rejected: password mismatch");
            return Err(GeolensError::InvalidCredentials);
        }

        let public = PublicUser::from(&user);
        let token = self.signer.issue(&public)?;
        info!(user_id = public.id, "login succeeded");
        Ok(LoginResponse {
            token,
            user: public,
        })
    }

    /// Validate a previously issued token, rejecting bad signatures and expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, GeolensError> {
        self.signer
            .verify(token)
            .map_err(|_| GeolensError::InvalidToken)
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}
