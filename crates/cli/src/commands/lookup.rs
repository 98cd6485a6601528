//! Manual CEP and CPF lookups against the configured APIs.
//!
//! # Environment Variables
//!
//! - `SIGNUP_ADDRESS_BASE_URL` - CEP lookup base URL
//! - `SIGNUP_IDENTITY_BASE_URL` - CPF lookup base URL
//! - `SIGNUP_IDENTITY_TOKEN` - Bearer token for the CPF lookup
//! - `SIGNUP_CSRF_TOKEN` - Required by the shared API configuration

use member_signup_core::{DocumentNumber, PostalCode};
use member_signup_web::config::ApiConfig;
use member_signup_web::services::{AddressClient, IdentityClient};
use tracing::info;

/// Look up and log the address of a CEP.
///
/// # Errors
///
/// Returns an error if the CEP is incomplete, the configuration is invalid
/// or the request fails.
pub async fn address(cep: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let postal_code = PostalCode::parse(cep)?;
    let api = ApiConfig::from_env()?;
    let client = AddressClient::new(&api.address_base_url)?;

    match client.lookup(&postal_code).await? {
        Some(fields) => info!(
            street = %fields.street,
            district = %fields.district,
            city = %fields.city,
            state = %fields.state,
            complement = %fields.complement,
            "Address found for {}",
            postal_code.masked()
        ),
        None => info!("No address for {}", postal_code.masked()),
    }
    Ok(())
}

/// Look up and log the name and birth date of a CPF.
///
/// # Errors
///
/// Returns an error if the CPF is incomplete, the configuration is invalid
/// or the request fails.
pub async fn document(cpf: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let document = DocumentNumber::parse(cpf)?;
    let api = ApiConfig::from_env()?;
    let client = IdentityClient::new(&api.identity_base_url, &api.identity_token)?;

    match client.lookup(&document).await? {
        Some(fields) => info!(birth = %fields.birth, "Name found: {}", fields.name),
        None => info!("No name for {}", document.masked()),
    }
    Ok(())
}
