//! Member signup server library.
//!
//! Serves the member registration form and drives the form sessions behind
//! it. The binary in `main.rs` only loads configuration, sets up tracing and
//! Sentry, and serves [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with every layer except Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check upstream APIs.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use member_signup_core::ReferrerDirectory;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{ApiConfig, SignupConfig};

    fn test_app() -> Router {
        let config = SignupConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api: ApiConfig {
                registration_url: "http://127.0.0.1:9/api/submitLp".to_string(),
                csrf_token: SecretString::from("Qk7vN2xR9mLp4TzW8cYb3HdF6jGs1Ua5"),
                identity_base_url: "http://127.0.0.1:9".to_string(),
                identity_token: SecretString::from("Zt4pW9sK2bN7qXc5Lm8vR3yH6dJf1Ge0"),
                address_base_url: "http://127.0.0.1:9".to_string(),
            },
            form_idle: Duration::from_secs(60),
            referrers_file: None,
            static_dir: PathBuf::from("static"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        app(AppState::new(config, ReferrerDirectory::builtin()).unwrap())
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_unknown_representative_renders_not_found() {
        let response = test_app()
            .oneshot(Request::builder().uri("/999999").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(body_text(response).await.contains("Representante não encontrado"));
    }

    #[tokio::test]
    async fn test_masked_field_fragment() {
        let request = Request::builder()
            .method("POST")
            .uri("/form/field/cep")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from("cep=01310100"))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        assert!(body_text(response).await.contains(r#"value="01310-100""#));
    }
}
