//! Clients for the external APIs and the live form registry.
//!
//! # Services
//!
//! - `address` - CEP lookup (auto-fills the address block)
//! - `identity` - CPF lookup (auto-fills name and birth date)
//! - `registration` - Posts the finished registration
//! - `forms` - In-memory registry of live form sessions

pub mod address;
pub mod forms;
pub mod identity;
pub mod registration;

use std::time::Duration;

use thiserror::Error;

pub use address::AddressClient;
pub use forms::{FormHandle, FormRegistry};
pub use identity::IdentityClient;
pub use registration::{RegistrationClient, RegistrationError};

/// Upper bound for a single CEP or CPF lookup. Registrations have none.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during a CEP or CPF lookup.
///
/// Lookups are best-effort: callers log these and leave the draft alone.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API error: status {0}")]
    Status(u16),

    /// The configured token is not a valid header value.
    #[error("Invalid token format: {0}")]
    InvalidToken(String),
}
