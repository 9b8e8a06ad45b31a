//! Error taxonomy shared across the generation core.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::ErrorResponse;

/// Errors produced by the quota, composition, naming and ledger paths.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The free-tier monthly document limit is exhausted.
    #[error("Document limit reached. Upgrade to premium for unlimited access.")]
    QuotaExceeded,

    /// The request payload failed validation; the caller must correct it.
    #[error("{0}")]
    Validation(String),

    /// The requested feature or template is gated behind a premium plan.
    #[error("{0} requires a premium subscription.")]
    PremiumRequired(&'static str),

    /// Writing or reading a generated artifact failed.
    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),

    /// The PDF or image renderer failed.
    #[error("document rendering failed: {0}")]
    Render(String),

    /// Ownership-scoped lookup miss.
    #[error("Document not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    fn error_type(&self) -> &'static str {
        match self {
            CoreError::QuotaExceeded => "QuotaExceeded",
            CoreError::Validation(_) => "ValidationError",
            CoreError::PremiumRequired(_) => "PremiumRequired",
            CoreError::Storage(_) | CoreError::Render(_) => "StorageError",
            CoreError::NotFound => "NotFound",
            CoreError::Database(_) | CoreError::Internal(_) => "InternalServerError",
        }
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::QuotaExceeded | CoreError::PremiumRequired(_) => StatusCode::FORBIDDEN,
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound => StatusCode::NOT_FOUND,
            CoreError::Storage(_)
            | CoreError::Render(_)
            | CoreError::Database(_)
            | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Operators get the detail; clients of a 5xx get a generic message.
        let message = if self.status_code().is_server_error() {
            log::error!("request failed: {self}");
            "Failed to generate document".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.error_type(), &message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CoreError::QuotaExceeded.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            CoreError::PremiumRequired("Bulk certificate generation").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            CoreError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(CoreError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            CoreError::Render("typst exited".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_premium_message() {
        let err = CoreError::PremiumRequired("Bulk certificate generation");
        assert_eq!(
            err.to_string(),
            "Bulk certificate generation requires a premium subscription."
        );
    }
}
