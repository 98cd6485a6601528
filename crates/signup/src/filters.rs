//! Custom Askama template filters.

use std::fmt::Display;

use chrono::Datelike;
use member_signup_core::unmask;

/// `wa.me` chat URL for a WhatsApp number in any punctuation.
#[must_use]
pub fn whatsapp_url(contact: &str) -> String {
    format!("https://wa.me/{}", unmask(contact))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    Ok(chrono::Utc::now().year())
}

/// Chat link for a representative's WhatsApp contact.
///
/// Usage in templates: `{{ form.referrer_contact|whatsapp_link }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn whatsapp_link(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(whatsapp_url(&value.to_string()))
}
