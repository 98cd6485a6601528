//! CPF lookup client.

use member_signup_core::{DocumentNumber, IdentityFields, IdentityLookupResponse};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{LookupError, REQUEST_TIMEOUT};

/// Client for the document lookup (`GET {base}/api/check_cpf_lp/{cpf}`).
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// Create a new identity lookup client.
    ///
    /// The bearer token is attached to every request as a sensitive header.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(base_url: &str, token: &SecretString) -> Result<Self, LookupError> {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| LookupError::InvalidToken(e.to_string()))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the person registered under a complete CPF.
    ///
    /// Returns `Ok(None)` unless the API knows a non-empty name.
    ///
    /// A non-success status is an error without reading the body. The API
    /// may still send JSON with it, but a lookup is best-effort and the form
    /// is left as typed either way.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the API answers with a non-success
    /// status, or the body is not the expected JSON.
    #[instrument(skip_all)]
    pub async fn lookup(
        &self,
        document: &DocumentNumber,
    ) -> Result<Option<IdentityFields>, LookupError> {
        let url = format!("{}/api/check_cpf_lp/{}", self.base_url, document.as_str());

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: IdentityLookupResponse = response.json().await?;
        Ok(body.into_fields())
    }
}
