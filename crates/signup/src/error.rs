//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use member_signup_core::FormError;
use thiserror::Error;

/// Application-level error type for the signup server.
#[derive(Debug, Error)]
pub enum AppError {
    /// The form rejected the change or submission.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Session(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Form(err) => match err {
                FormError::Field(_) => StatusCode::BAD_REQUEST,
                FormError::PlanNotOffered { .. } | FormError::Incomplete(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                FormError::SubmissionInFlight | FormError::Discarded => StatusCode::CONFLICT,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Form(FormError::SubmissionInFlight) => {
                "Cadastro em andamento, aguarde.".to_string()
            }
            Self::Form(FormError::Discarded) => {
                "Formulário expirado, recarregue a página.".to_string()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for form actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error. Never pass field values here.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use member_signup_core::{Field, FieldError, Operator};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("unknown operator: OI".to_string());
        assert_eq!(err.to_string(), "Bad request: unknown operator: OI");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(FormError::SubmissionInFlight.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(FormError::Discarded.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(FormError::Field(FieldError::UnknownField("x".to_string())).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                FormError::PlanNotOffered {
                    operator: Operator::Tim,
                    plan_id: "178".to_string(),
                }
                .into()
            ),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(FormError::Incomplete(vec![Field::Document]).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
