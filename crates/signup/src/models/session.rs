//! Session-related helpers.
//!
//! The session holds a single value: the id of the visitor's live form.

use tower_sessions::Session;
use uuid::Uuid;

/// Session keys.
pub mod keys {
    /// Key for the id of the visitor's live form.
    pub const FORM_ID: &str = "form_id";
}

/// Get the form id from the session.
pub async fn get_form_id(session: &Session) -> Option<Uuid> {
    session.get::<Uuid>(keys::FORM_ID).await.ok().flatten()
}

/// Set the form id in the session.
///
/// # Errors
///
/// Returns error if the session store fails.
pub async fn set_form_id(session: &Session, id: Uuid) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FORM_ID, id).await
}
