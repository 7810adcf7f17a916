//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Errors are rendered as `{"error": message, "field": name}`, `field` being
//! present only for field-level validation failures.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use multiverse_core::CatalogError;

use crate::db::RepositoryError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Write-path validation or relation failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::UnknownRelation { .. })
            | Self::Database(RepositoryError::NotFound)
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Catalog(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            match &self {
                Self::NotFound(what) => format!("{what} not found"),
                Self::BadRequest(reason) => reason.clone(),
                Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
                Self::Database(RepositoryError::Conflict(reason)) => reason.clone(),
                _ => self.to_string(),
            }
        };
        let field = match &self {
            Self::Catalog(err) => err.field(),
            _ => None,
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                field,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use multiverse_core::ShopType;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request_with_field() {
        let (status, body) = render(AppError::from(CatalogError::MissingMandatoryField {
            field: "amertume_ibu".to_string(),
            shop_type: ShopType::Brewery,
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "amertume_ibu");
        assert_eq!(
            body["error"],
            "missing mandatory field `amertume_ibu` for brewery products"
        );
    }

    #[tokio::test]
    async fn test_unknown_relation_is_not_found() {
        let (status, body) = render(AppError::from(CatalogError::UnknownRelation {
            entity: "shop",
            id: 12,
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "shop 12 not found");
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn test_database_errors_are_hidden() {
        let (status, body) = render(AppError::from(RepositoryError::DataCorruption(
            "invalid price for product 3".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_bad_request() {
        let (status, _) = render(AppError::from(CatalogError::MalformedAttributePayload(
            "expected a JSON object, got an array".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
