/// Error types for the feed service.
///
/// Every failure path returns a classified error; the HTTP and GraphQL
/// surfaces map the classification to their own wire format so that the
/// same fault looks the same through either door.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use async_graphql::ErrorExtensions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for feed-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// One violated field rule inside a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed one or more field rules; each entry is one violation.
    #[error("Validation failed, provided data is incorrect")]
    Validation(Vec<FieldError>),

    /// No usable credential was supplied, or it did not match an identity.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// A credential was supplied but could not be verified.
    #[error("Credential verification failed: {0}")]
    CredentialVerification(String),

    /// Valid identity, wrong owner.
    #[error("Not authorized: {0}")]
    Forbidden(String),

    /// Referenced entity absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence or asset-store call failed; cause preserved for logs.
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl AppError {
    /// Stable classification code, identical across both surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::CredentialVerification(_) => "CREDENTIAL_VERIFICATION",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Upstream(_) => "UPSTREAM_FAILURE",
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            // Distinct kind from Unauthenticated, same 401 class: a supplied
            // credential that fails verification also blocks access.
            AppError::CredentialVerification(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if let AppError::Upstream(cause) = self {
            tracing::error!(%cause, "upstream failure surfaced to client");
        }

        HttpResponse::build(status).json(serde_json::json!({
            "message": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
            "errors": self.field_errors(),
        }))
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.code());
            ext.set("status", self.status_code().as_u16());
            ext.set(
                "errors",
                async_graphql::Value::List(
                    self.field_errors()
                        .iter()
                        .map(|e| {
                            async_graphql::value!({
                                "field": e.field.clone(),
                                "message": e.message.clone(),
                            })
                        })
                        .collect(),
                ),
            );
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<crypto_core::password::PasswordError> for AppError {
    fn from(err: crypto_core::password::PasswordError) -> Self {
        AppError::Upstream(err.to_string())
    }
}
