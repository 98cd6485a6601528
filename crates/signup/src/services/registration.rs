//! Registration API client.

use member_signup_core::RegistrationPayload;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

/// Header carrying the anti-forgery token.
const CSRF_HEADER: &str = "x-csrf-token";

/// Errors that can occur when posting a registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// The configured token is not a valid header value.
    #[error("Invalid token format: {0}")]
    InvalidToken(String),
}

/// Client for the registration endpoint.
///
/// Sends exactly one `POST` per submission, with no retry and no request
/// timeout.
#[derive(Clone)]
pub struct RegistrationClient {
    client: reqwest::Client,
    url: String,
}

impl RegistrationClient {
    /// Create a new registration client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(url: &str, csrf_token: &SecretString) -> Result<Self, RegistrationError> {
        let mut token = HeaderValue::from_str(csrf_token.expose_secret())
            .map_err(|e| RegistrationError::InvalidToken(e.to_string()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(CSRF_HEADER), token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Post a registration as JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API answers with a
    /// non-success status.
    #[instrument(skip_all, fields(representative_id = %payload.representative_id))]
    pub async fn submit(&self, payload: &RegistrationPayload) -> Result<(), RegistrationError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RegistrationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
