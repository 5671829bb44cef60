use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::packets::RenderError;
use crate::services::RepositoryError;

/// Errors surfaced by the matching and packet services
///
/// `NotFound` and `Validation` reflect caller input and are never retried.
/// Storage failures are passed through as-is, with no rollback of
/// partially-completed multi-step operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    UpstreamStorage(#[source] RepositoryError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(what) => ServiceError::NotFound(what),
            other => ServiceError::UpstreamStorage(other),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(value: validator::ValidationErrors) -> Self {
        ServiceError::Validation(value.to_string())
    }
}

impl ServiceError {
    fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Validation(_) => "validation_error",
            ServiceError::UpstreamStorage(_) => "storage_error",
            ServiceError::Render(_) => "render_error",
            ServiceError::Io(_) => "io_error",
        }
    }
}

impl error::ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::UpstreamStorage(_) | ServiceError::Render(_) | ServiceError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ServiceError::Validation(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    ServiceError::Validation(format!("Invalid query: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err: ServiceError = RepositoryError::NotFound("profile p1".to_string()).into();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_failure_is_internal() {
        let err: ServiceError = RepositoryError::Corrupt("bad row".to_string()).into();
        assert!(matches!(err, ServiceError::UpstreamStorage(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = ServiceError::Validation("Unsupported format: csv".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Validation failed: Unsupported format: csv");
    }
}
