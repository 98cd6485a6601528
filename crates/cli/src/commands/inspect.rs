//! Offline commands: masks, path resolution and the plan catalog.

use std::path::Path;

use member_signup_core::{MaskKind, Operator, PlanCatalog};
use tracing::info;

use super::referrer_directory;

/// Apply a display mask and log the result.
///
/// # Errors
///
/// Returns an error if `kind` is not a known mask.
pub fn mask(kind: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let kind: MaskKind = kind.parse()?;
    info!(kind = %kind, "{}", kind.apply(value));
    Ok(())
}

/// Resolve a request path to a representative.
///
/// # Errors
///
/// Returns an error if the representative list cannot be loaded or the path
/// names an unknown representative.
pub fn resolve(path: &str, referrers: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let directory = referrer_directory(referrers)?;
    info!(representatives = directory.len(), "Loaded representative list");

    let referrer = directory.resolve(path)?;
    info!(
        id = %referrer.id,
        contact = referrer.contact.as_deref().unwrap_or("-"),
        "Representative: {}",
        referrer.name
    );
    Ok(())
}

/// List the plans of one operator, or of every operator.
///
/// # Errors
///
/// Returns an error if `operator` is not a known operator code.
pub fn plans(operator: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let operators = match operator {
        Some(code) => vec![code.parse::<Operator>()?],
        None => Operator::ALL.to_vec(),
    };

    for operator in operators {
        for plan in PlanCatalog.plans(operator) {
            info!(operator = operator.code(), plan_id = plan.id, "{}", plan.label);
        }
    }
    Ok(())
}
