use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::underwriting::router::status_for;
use crate::workflows::underwriting::{
    ApplicationImportError, ConfigurationError, UnderwritingServiceError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(ApplicationImportError),
    Underwriting(UnderwritingServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Underwriting(err) => write!(f, "underwriting error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Underwriting(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Underwriting(ref err) => status_for(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(value: ConfigurationError) -> Self {
        Self::Config(ConfigError::Underwriting(value))
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ApplicationImportError> for AppError {
    fn from(value: ApplicationImportError) -> Self {
        Self::Import(value)
    }
}

impl From<UnderwritingServiceError> for AppError {
    fn from(value: UnderwritingServiceError) -> Self {
        Self::Underwriting(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::underwriting::{
        AssessmentError, RepositoryError, ScorerError, ValidationError,
    };

    fn status(err: UnderwritingServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn underwriting_failures_keep_the_router_status() {
        let invalid = AssessmentError::from(ValidationError::Missing { field: "age" });
        assert_eq!(status(invalid.into()), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status(ScorerError::Unavailable("model offline".to_string()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status(RepositoryError::Conflict.into()), StatusCode::CONFLICT);
        assert_eq!(
            status(RepositoryError::Unavailable("disk full".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn import_failures_are_bad_requests() {
        let err = AppError::from(ApplicationImportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing export",
        )));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
