//! Manual registration from a draft file.
//!
//! The draft goes through the same form session as the web page, so masks,
//! plan checks and required fields behave identically.
//!
//! # Draft file
//!
//! ```yaml
//! cpf: "123.456.789-01"
//! birth: "1990-05-17"
//! name: Maria Silva
//! email: maria@example.com
//! cell: "11987654321"
//! cep: "01310-100"
//! district: Bela Vista
//! city: São Paulo
//! state: SP
//! street: Avenida Paulista
//! number: "1000"
//! typeChip: eSim
//! plan_id: "69"
//! ```

use std::path::Path;

use member_signup_core::{Draft, Field, FormError, FormSession, PlanCatalog};
use member_signup_web::config::ApiConfig;
use member_signup_web::services::RegistrationClient;
use thiserror::Error;
use tracing::info;

use super::referrer_directory;

/// Errors that can occur while building a submission from a file.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The draft file names a plan no operator offers.
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    /// Required fields are blank.
    #[error("Missing required fields: {0}")]
    Incomplete(String),

    /// The form rejected a value.
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Load a draft into a fresh form session.
///
/// The operator is taken from the draft's plan, then every field is applied
/// in form order.
///
/// # Errors
///
/// Returns an error if the plan is unknown or a field value is rejected.
pub fn load_draft(draft: &Draft) -> Result<FormSession, SubmitError> {
    let mut form = FormSession::new();

    if !draft.plan_id.is_empty() {
        let (operator, _) = PlanCatalog
            .find(&draft.plan_id)
            .ok_or_else(|| SubmitError::UnknownPlan(draft.plan_id.clone()))?;
        form.select_operator(operator)?;
    }

    for field in Field::ALL {
        form.change(field, draft.value(field))?;
    }
    Ok(form)
}

/// Build and post a registration from a YAML draft file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the draft is incomplete, the
/// path names an unknown representative, or the API rejects the submission.
pub async fn from_file(
    file: &Path,
    path: &str,
    referrers: Option<&Path>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let directory = referrer_directory(referrers)?;
    let referrer = directory.resolve(path)?;

    info!(path = %file.display(), "Loading draft");
    let content = tokio::fs::read_to_string(file).await?;
    let draft: Draft = serde_yaml::from_str(&content)?;

    let mut form = load_draft(&draft)?;
    let ticket = match form.begin_submission(referrer) {
        Ok(ticket) => ticket,
        Err(FormError::Incomplete(missing)) => {
            let labels: Vec<_> = missing.iter().map(|field| field.label()).collect();
            return Err(SubmitError::Incomplete(labels.join(", ")).into());
        }
        Err(e) => return Err(e.into()),
    };

    if dry_run {
        info!(
            representative_id = %referrer.id,
            "Payload: {}",
            serde_yaml::to_string(ticket.payload())?
        );
        return Ok(());
    }

    let api = ApiConfig::from_env()?;
    let client = RegistrationClient::new(&api.registration_url, &api.csrf_token)?;

    info!(representative_id = %referrer.id, "Submitting registration");
    client.submit(ticket.payload()).await?;
    info!("Registration accepted");
    Ok(())
}
