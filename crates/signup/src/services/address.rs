//! CEP lookup client.

use member_signup_core::{AddressFields, AddressLookupResponse, PostalCode};
use tracing::instrument;

use super::{LookupError, REQUEST_TIMEOUT};

/// Client for the postal-code lookup (`GET {base}/ws/{cep}/json/`).
#[derive(Clone)]
pub struct AddressClient {
    client: reqwest::Client,
    base_url: String,
}

impl AddressClient {
    /// Create a new address lookup client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the address of a complete CEP.
    ///
    /// Returns `Ok(None)` when the API flags the CEP as unknown.
    ///
    /// A non-success status is an error without reading the body. The API
    /// may still send JSON with it, but a lookup is best-effort and the form
    /// is left as typed either way.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the API answers with a non-success
    /// status, or the body is not the expected JSON.
    #[instrument(skip(self), fields(cep = %postal_code))]
    pub async fn lookup(
        &self,
        postal_code: &PostalCode,
    ) -> Result<Option<AddressFields>, LookupError> {
        let url = format!("{}/ws/{}/json/", self.base_url, postal_code.as_str());

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: AddressLookupResponse = response.json().await?;
        Ok(body.into_fields())
    }
}
