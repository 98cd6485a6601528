//! Page route handlers.
//!
//! The form is served at `/<representative id>`. Mounting the page opens a
//! fresh form and discards the one the browser session pointed at before.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use member_signup_core::ResolveError;
use tower_sessions::Session;
use tracing::instrument;

use super::form::FormView;
use crate::error::Result;
use crate::filters;
use crate::models::session::{get_form_id, set_form_id};
use crate::state::AppState;

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub form: FormView,
}

/// Unknown representative page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub id: String,
}

/// Whether the path names a file (`/favicon.ico`, `/robots.txt`).
///
/// Browsers fetch these on their own; they must not remount the form.
fn is_file_request(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

/// Render the registration page for the representative named by the path.
#[instrument(skip(state, session), fields(path = %uri.path()))]
pub async fn show(State(state): State<AppState>, session: Session, uri: Uri) -> Result<Response> {
    if is_file_request(uri.path()) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let referrer = match state.referrers().resolve(uri.path()) {
        Ok(referrer) => referrer.clone(),
        Err(ResolveError::NotFound(id)) => {
            tracing::info!(%id, "Unknown representative");
            return Ok((StatusCode::NOT_FOUND, NotFoundTemplate { id }).into_response());
        }
        Err(e) => return Err(crate::error::AppError::Internal(e.to_string())),
    };

    if let Some(previous) = get_form_id(&session).await {
        state.forms().discard(&previous).await;
    }

    let handle = state.forms().open(referrer).await;
    set_form_id(&session, handle.id()).await?;

    let form = FormView::new(&*handle.lock().await, handle.referrer());
    Ok(PageTemplate { form }.into_response())
}
