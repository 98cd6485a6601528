//! Application state shared across handlers.

use std::sync::Arc;

use member_signup_core::ReferrerDirectory;

use crate::config::SignupConfig;
use crate::services::{
    AddressClient, FormRegistry, IdentityClient, LookupError, RegistrationClient,
    RegistrationError,
};

/// Error creating the upstream API clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("lookup client: {0}")]
    Lookup(#[from] LookupError),
    #[error("registration client: {0}")]
    Registration(#[from] RegistrationError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the representative directory, the live forms and the
/// upstream API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SignupConfig,
    referrers: ReferrerDirectory,
    forms: FormRegistry,
    address: AddressClient,
    identity: IdentityClient,
    registration: RegistrationClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Signup configuration
    /// * `referrers` - Representative directory, loaded once at startup
    ///
    /// # Errors
    ///
    /// Returns an error if one of the API clients cannot be built.
    pub fn new(config: SignupConfig, referrers: ReferrerDirectory) -> Result<Self, StateError> {
        let api = &config.api;
        let address = AddressClient::new(&api.address_base_url)?;
        let identity = IdentityClient::new(&api.identity_base_url, &api.identity_token)?;
        let registration = RegistrationClient::new(&api.registration_url, &api.csrf_token)?;
        let forms = FormRegistry::new(config.form_idle);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                referrers,
                forms,
                address,
                identity,
                registration,
            }),
        })
    }

    /// Get a reference to the signup configuration.
    #[must_use]
    pub fn config(&self) -> &SignupConfig {
        &self.inner.config
    }

    /// Get a reference to the representative directory.
    #[must_use]
    pub fn referrers(&self) -> &ReferrerDirectory {
        &self.inner.referrers
    }

    /// Get a reference to the live form registry.
    #[must_use]
    pub fn forms(&self) -> &FormRegistry {
        &self.inner.forms
    }

    /// Get a reference to the CEP lookup client.
    #[must_use]
    pub fn address(&self) -> &AddressClient {
        &self.inner.address
    }

    /// Get a reference to the CPF lookup client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get a reference to the registration API client.
    #[must_use]
    pub fn registration(&self) -> &RegistrationClient {
        &self.inner.registration
    }
}
