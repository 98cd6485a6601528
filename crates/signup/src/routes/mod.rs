//! HTTP route handlers for the signup server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Form, default representative
//! GET  /{*path}                    - Form for the representative in the path (404 page if unknown)
//!
//! # Form (HTMX fragments)
//! POST /form/field/{field}         - Apply one change (masked input fragment or 204)
//! POST /form/operator/{operator}   - Select operator (plans fragment)
//! POST /form/lookup/address        - CEP blur (address fragment)
//! POST /form/lookup/document       - CPF blur (identity fragment)
//! POST /form/submit                - Submit (whole form fragment)
//! ```

pub mod form;
pub mod page;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{field_rate_limiter, lookup_rate_limiter, submit_rate_limiter};
use crate::state::AppState;

/// Create the lookup routes router.
pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/address", post(form::lookup_address))
        .route("/document", post(form::lookup_document))
        .layer(lookup_rate_limiter())
}

/// Create the form routes router.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/field/{field}",
            post(form::change_field).layer(field_rate_limiter()),
        )
        .route(
            "/operator/{operator}",
            post(form::select_operator).layer(field_rate_limiter()),
        )
        .route(
            "/submit",
            post(form::submit).layer(submit_rate_limiter()),
        )
        .nest("/lookup", lookup_routes())
}

/// Create all routes for the signup server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(page::show))
        .nest("/form", form_routes())
        .route("/{*path}", get(page::show))
}
