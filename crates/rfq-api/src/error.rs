//! API error taxonomy.
//!
//! Client-caused failures carry field-level detail and map to 400/401;
//! anything unexpected becomes an opaque 500 with the detail retained
//! for diagnostics only. Collaborator failures arrive as
//! [`ServiceError`], whose explicit `Api` variant marks an error as
//! already client-safe so it passes through unchanged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::ser::Serializer;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Field-level validation error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    RequiredField,
    IncorrectFormat,
    InvalidAddress,
    AddressNotSupported,
    ValueOutOfRange,
    FieldInvalid,
    TokenNotSupported,
}

impl ValidationErrorCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::RequiredField => 1000,
            Self::IncorrectFormat => 1001,
            Self::InvalidAddress => 1002,
            Self::AddressNotSupported => 1003,
            Self::ValueOutOfRange => 1004,
            Self::FieldInvalid => 1005,
            Self::TokenNotSupported => 1006,
        }
    }
}

impl Serialize for ValidationErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

/// One offending field with its reason.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationErrorItem {
    pub field: String,
    pub code: ValidationErrorCode,
    pub reason: String,
}

impl ValidationErrorItem {
    pub fn new(
        field: impl Into<String>,
        code: ValidationErrorCode,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", format_validation_errors(.0))]
    Validation(Vec<ValidationErrorItem>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidApiKey(String),

    #[error("Not found")]
    NotFound,

    /// The retained message is logged, never sent to the client.
    #[error("Unexpected error encountered")]
    Internal(String),
}

fn format_validation_errors(items: &[ValidationErrorItem]) -> String {
    items
        .iter()
        .map(|item| item.reason.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    pub fn validation(
        field: impl Into<String>,
        code: ValidationErrorCode,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation(vec![ValidationErrorItem::new(field, code, reason)])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidApiKey(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "validationErrors", skip_serializing_if = "Option::is_none")]
    validation_errors: Option<Vec<ValidationErrorItem>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            // Retained for diagnostics; the client sees a generic message.
            error!(%detail, "Unexpected error while handling request");
        }
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            validation_errors: match self {
                Self::Validation(items) => Some(items),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Failure surface of a per-chain swap service.
///
/// The tagged variants let the routing layer translate without
/// inspecting error classes: client-caused messages become 400s with
/// the message intact, `Api` errors are already client-safe and pass
/// through unchanged, and everything else is wrapped once at the
/// boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    ClientCaused(String),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ClientCaused(message) => ApiError::BadRequest(message),
            ServiceError::Api(api_error) => api_error,
            ServiceError::Other(inner) => ApiError::Internal(format!("{inner:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_joins_reasons() {
        let err = ApiError::Validation(vec![
            ValidationErrorItem::new(
                "makerToken",
                ValidationErrorCode::RequiredField,
                "The request is missing parameters: makerToken",
            ),
            ValidationErrorItem::new(
                "marketOperation",
                ValidationErrorCode::FieldInvalid,
                "'Trade' is an invalid market operation",
            ),
        ]);
        let message = err.to_string();
        assert!(message.contains("missing parameters"));
        assert!(message.contains("invalid market operation"));
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = ApiError::Internal("database password leaked".to_string());
        assert_eq!(err.to_string(), "Unexpected error encountered");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_service_error_translation() {
        let client: ApiError = ServiceError::ClientCaused("no liquidity".to_string()).into();
        assert_eq!(client.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(client.to_string(), "no liquidity");

        let passthrough: ApiError = ServiceError::Api(ApiError::NotFound).into();
        assert_eq!(passthrough.status_code(), StatusCode::NOT_FOUND);

        let wrapped: ApiError = ServiceError::Other(anyhow::anyhow!("The service blew up")).into();
        assert_eq!(wrapped.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(wrapped.to_string(), "Unexpected error encountered");
    }

    #[test]
    fn test_validation_codes_are_stable() {
        assert_eq!(ValidationErrorCode::RequiredField.as_u16(), 1000);
        assert_eq!(ValidationErrorCode::TokenNotSupported.as_u16(), 1006);
    }
}
