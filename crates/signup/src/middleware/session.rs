//! Session middleware configuration.
//!
//! The browser session only carries the id of the visitor's live form, so
//! an in-memory store is enough.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::SignupConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "signup_session";

/// Create the session layer with an in-memory store.
///
/// Sessions expire after the same idle time as the forms they point at.
#[must_use]
pub fn create_session_layer(config: &SignupConfig) -> SessionManagerLayer<MemoryStore> {
    let idle = i64::try_from(config.form_idle.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
