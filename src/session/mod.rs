//! Process-wide session store: the single source of truth for "is
//! someone logged in, and with what credentials." All mutation goes
//! through the entry points here; consumers read via lookups and never
//! touch persisted credentials directly.

pub mod persist;

use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::auth::User;
use crate::ui::{self, Route};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

lazy_static! {
    static ref CURRENT_SESSION: Arc<RwLock<Option<Session>>> = Arc::new(RwLock::new(None));
}

/// Stores identity and both credentials atomically and persists them for
/// reload survival. Identity is never stored without both tokens.
pub fn establish(user: User, access_token: String, refresh_token: String) {
    let session = Session { user, access_token, refresh_token };
    persist::write_json(persist::SESSION_FILE, &session);
    *CURRENT_SESSION.write() = Some(session);
}

pub fn current() -> Option<User> {
    CURRENT_SESSION.read().as_ref().map(|s| s.user.clone())
}

pub fn is_authenticated() -> bool {
    CURRENT_SESSION.read().is_some()
}

pub fn access_token() -> Option<String> {
    CURRENT_SESSION.read().as_ref().map(|s| s.access_token.clone())
}

pub fn refresh_token() -> Option<String> {
    CURRENT_SESSION.read().as_ref().map(|s| s.refresh_token.clone())
}

/// Replaces the identity without touching credentials (after profile
/// edits). No-op when logged out.
pub fn update_user(user: User) {
    let mut guard = CURRENT_SESSION.write();
    if let Some(session) = guard.as_mut() {
        session.user = user;
        persist::write_json(persist::SESSION_FILE, session);
    } else {
        warn!("update_user with no active session");
    }
}

/// Replaces both credentials after a successful refresh, keeping the
/// identity. No-op when logged out.
pub fn rotate_tokens(access_token: String, refresh_token: String) {
    let mut guard = CURRENT_SESSION.write();
    if let Some(session) = guard.as_mut() {
        session.access_token = access_token;
        session.refresh_token = refresh_token;
        persist::write_json(persist::SESSION_FILE, session);
    } else {
        warn!("rotate_tokens with no active session");
    }
}

/// Clears the in-memory session and the persisted credential file
/// without any remote call or navigation. Forced logout and refresh
/// failure use this and emit their own redirect.
pub fn clear_local() {
    *CURRENT_SESSION.write() = None;
    persist::remove(persist::SESSION_FILE);
}

/// Full logout: best-effort server notification (failures ignored),
/// local clear, redirect to the login entry point.
pub async fn teardown(api: &ApiClient) {
    if let Some(refresh_token) = refresh_token() {
        let body = serde_json::json!({ "refreshToken": refresh_token });
        if let Err(e) = api.post::<serde_json::Value, _>("/auth/logout", &body).await {
            debug!("Logout notification failed (ignored): {}", e);
        }
    }
    clear_local();
    ui::navigate(Route::Login);
    ui::toast_success("Logged out successfully");
}

/// Startup restore: if a credential file survived the last run, load it
/// and validate against the remote identity endpoint. Success refreshes
/// the cached identity; failure silently clears local state (the HTTP
/// adapter already handled any recoverable token expiry).
pub async fn restore(api: &ApiClient) {
    let Some(saved) = persist::read_json::<Session>(persist::SESSION_FILE) else {
        debug!("No persisted session");
        return;
    };
    *CURRENT_SESSION.write() = Some(saved);

    match api.get::<User>("/auth/me").await {
        Ok(user) => {
            info!("Session restored for {}", user.email);
            update_user(user);
        }
        Err(e) => {
            debug!("Persisted session rejected: {}", e);
            clear_local();
        }
    }
}

#[cfg(test)]
pub(crate) fn test_session(access: &str, refresh: &str) -> Session {
    Session {
        user: crate::auth::test_user(),
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn set_for_test(session: Option<Session>) {
    *CURRENT_SESSION.write() = session;
}
