//! Integration tests for the member signup form.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p member-signup-integration-tests
//! ```
//!
//! Every test starts its own signup server on an ephemeral port, wired to a
//! mock of the three upstream APIs. No network access or credentials needed.
//!
//! # Test Categories
//!
//! - `page` - Representative resolution, not-found page, health, headers
//! - `fields` - Masked inputs, operator tabs, plan validation
//! - `lookups` - CEP and CPF auto-fill
//! - `submit` - Registration success, failure and blocked submissions

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use member_signup_core::{Referrer, ReferrerDirectory};
use member_signup_web::config::{ApiConfig, SignupConfig};
use member_signup_web::state::AppState;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Token the mock registration API expects in `X-CSRF-TOKEN`.
pub const CSRF_TOKEN: &str = "Qk7vN2xR9mLp4TzW8cYb3HdF6jGs1Ua5";

/// Token the mock CPF lookup expects after `Bearer `.
pub const IDENTITY_TOKEN: &str = "Zt4pW9sK2bN7qXc5Lm8vR3yH6dJf1Ge0";

/// CEP the mock address API knows.
pub const KNOWN_CEP: &str = "01310100";

/// CPF the mock identity API knows.
pub const KNOWN_CPF: &str = "12345678901";

/// CPF the mock identity API answers with `404` and a full JSON record.
pub const NOT_FOUND_CPF: &str = "11122233344";

/// Representative added next to the built-in default.
pub const SECOND_REFERRER_ID: &str = "222333";

// =============================================================================
// Mock Upstream APIs
// =============================================================================

#[derive(Clone, Default)]
struct UpstreamState {
    submissions: Arc<Mutex<Vec<Value>>>,
    registration_status: Arc<AtomicU16>,
    registration_delay_ms: Arc<AtomicU64>,
}

/// Handle on the mock upstream server.
#[derive(Clone)]
pub struct Upstream {
    /// Base URL of the mock server.
    pub url: String,
    state: UpstreamState,
}

impl Upstream {
    /// Start the mock on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = UpstreamState::default();
        state
            .registration_status
            .store(StatusCode::OK.as_u16(), Ordering::SeqCst);

        let router = Router::new()
            .route("/ws/{cep}/json/", get(address))
            .route("/api/check_cpf_lp/{cpf}", get(identity))
            .route("/api/submitLp", post(register))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("Mock upstream has no address");
        tokio::spawn(async move { axum::serve(listener, router).await });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Make the registration API answer with `status` from now on.
    pub fn set_registration_status(&self, status: StatusCode) {
        self.state
            .registration_status
            .store(status.as_u16(), Ordering::SeqCst);
    }

    /// Make the registration API wait `delay` before answering.
    pub fn set_registration_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.state
            .registration_delay_ms
            .store(millis, Ordering::SeqCst);
    }

    /// Bodies received by the registration API, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the recording mutex is poisoned.
    #[must_use]
    pub fn submissions(&self) -> Vec<Value> {
        self.state
            .submissions
            .lock()
            .expect("Submission log poisoned")
            .clone()
    }
}

async fn address(Path(cep): Path<String>) -> Json<Value> {
    if cep == KNOWN_CEP {
        Json(json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "complemento": "de 612 a 1510 - lado par",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP"
        }))
    } else {
        Json(json!({ "erro": "true" }))
    }
}

async fn identity(headers: HeaderMap, Path(cpf): Path<String>) -> Response {
    let expected = format!("Bearer {IDENTITY_TOKEN}");
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if cpf == NOT_FOUND_CPF {
        let record = json!({
            "status": "success",
            "data": { "nome_da_pf": "Nome Ignorado", "data_nascimento": "1980-01-01" }
        });
        return (StatusCode::NOT_FOUND, Json(record)).into_response();
    }

    if cpf == KNOWN_CPF {
        Json(json!({
            "status": "success",
            "data": {
                "id": 42,
                "nome_da_pf": "Maria Silva",
                "numero_de_cpf": KNOWN_CPF,
                "data_nascimento": "1990-05-17"
            }
        }))
        .into_response()
    } else {
        Json(json!({ "status": "error", "data": { "msg": "CPF não encontrado" } })).into_response()
    }
}

async fn register(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token_ok = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == CSRF_TOKEN);
    if !token_ok {
        return StatusCode::FORBIDDEN.into_response();
    }

    if let Ok(mut submissions) = state.submissions.lock() {
        submissions.push(body);
    }

    let delay = state.registration_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = StatusCode::from_u16(state.registration_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "ok": status.is_success() }))).into_response()
}

// =============================================================================
// Signup Server
// =============================================================================

/// A running signup server and a cookie-keeping client pointed at it.
pub struct TestApp {
    /// Base URL of the signup server.
    pub url: String,
    /// Client with a cookie store, so the form session sticks.
    pub client: Client,
    /// The mock upstream APIs.
    pub upstream: Upstream,
}

/// Representative directory used by every test server.
///
/// # Panics
///
/// Panics if the built-in default is missing, which cannot happen.
#[must_use]
pub fn test_referrers() -> ReferrerDirectory {
    let builtin = ReferrerDirectory::builtin();
    let default = builtin.default_referrer().clone();
    let second = Referrer {
        id: SECOND_REFERRER_ID.to_string(),
        name: "Joana Pereira".to_string(),
        contact: Some("(11) 99999-0000".to_string()),
    };
    let default_id = default.id.clone();
    ReferrerDirectory::new([default, second], default_id).expect("Default referrer present")
}

fn test_config(upstream: &Upstream) -> SignupConfig {
    SignupConfig {
        host: "127.0.0.1".parse().expect("Valid loopback address"),
        port: 0,
        base_url: "http://localhost".to_string(),
        api: ApiConfig {
            registration_url: format!("{}/api/submitLp", upstream.url),
            csrf_token: SecretString::from(CSRF_TOKEN),
            identity_base_url: upstream.url.clone(),
            identity_token: SecretString::from(IDENTITY_TOKEN),
            address_base_url: upstream.url.clone(),
        },
        form_idle: Duration::from_secs(60),
        referrers_file: None,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../signup/static"),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

impl TestApp {
    /// Start a signup server backed by a fresh mock upstream.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot be started.
    pub async fn spawn() -> Self {
        let upstream = Upstream::start().await;
        Self::spawn_with(upstream).await
    }

    /// Start a signup server backed by `upstream`.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn spawn_with(upstream: Upstream) -> Self {
        let config = test_config(&upstream);
        let state = AppState::new(config, test_referrers()).expect("Failed to build app state");
        let app = member_signup_web::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind signup server");
        let addr = listener.local_addr().expect("Signup server has no address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: format!("http://{addr}"),
            client,
            upstream,
        }
    }

    /// `GET` a page path and return status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let resp = self
            .client
            .get(format!("{}{path}", self.url))
            .send()
            .await
            .expect("GET failed");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }

    /// `POST` form values the way HTMX does and return status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post(&self, path: &str, values: &[(&str, &str)]) -> (StatusCode, String) {
        let resp = self
            .client
            .post(format!("{}{path}", self.url))
            .header("hx-request", "true")
            .form(values)
            .send()
            .await
            .expect("POST failed");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }
}

/// Every value of a complete registration, as typed by a visitor.
#[must_use]
pub const fn complete_form() -> [(&'static str, &'static str); 14] {
    [
        ("cpf", "123.456.789-01"),
        ("birth", "1990-05-17"),
        ("name", "Maria Silva"),
        ("email", "maria@example.com"),
        ("phone", "(11) 3333-4444"),
        ("cell", "(11) 98765-4321"),
        ("cep", "01310-100"),
        ("district", "Bela Vista"),
        ("city", "São Paulo"),
        ("state", "SP"),
        ("street", "Avenida Paulista"),
        ("number", "1000"),
        ("typeChip", "eSim"),
        ("plan_id", "69"),
    ]
}
