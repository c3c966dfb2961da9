//! Client session state and the view gate that depends on it.

use crate::client::storage::LocalStorage;
use crate::config::{TOKEN_KEY, USER_KEY};
use crate::db::PublicUser;
use crate::error::GeolensError;
use crate::types::LoginResponse;
use tracing::{debug, warn};

/// A logged-in client: the token returned by `/login` and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

impl Session {
    /// Rebuild the session from storage on startup. A missing token or an
    /// unreadable user blob means there is no session.
    pub fn restore(storage: &LocalStorage) -> Option<Self> {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty())?;
        let raw = storage.get(USER_KEY)?;
        let user = match serde_json::from_str::<PublicUser>(&raw) {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "stored user is malformed; no session");
                return None;
            }
        };
        Some(Self { token, user })
    }

    /// Persist a successful login.
    pub fn establish(storage: &LocalStorage, resp: LoginResponse) -> Result<Self, GeolensError> {
        storage.set(TOKEN_KEY, resp.token.clone())?;
        storage.set(USER_KEY, serde_json::to_string(&resp.user)?)?;
        debug!(user_id = resp.user.id, "session established");
        Ok(Self {
            token: resp.token,
            user: resp.user,
        })
    }

    /// Log out: wipe all client-local state, history included.
    pub fn teardown(storage: &LocalStorage) -> Result<(), GeolensError> {
        storage.clear()
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(Route),
}

/// Decide what to show for `requested` given whether a session exists.
pub fn gate(has_session: bool, requested: Route) -> Navigation {
    match (has_session, requested) {
        (true, Route::Home) => Navigation::Render(View::Home),
        (true, Route::Login) => Navigation::Redirect(Route::Home),
        (false, Route::Login) => Navigation::Render(View::Login),
        (false, Route::Home) => Navigation::Redirect(Route::Login),
    }
}
