//! HTTP-facing error type. Every handler returns `Result<_, PortalError>`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::approval::ApprovalError;
use crate::records::RecordSourceError;
use crate::requests::lifecycle::LifecycleError;
use crate::requests::repository::RepositoryError;
use crate::validation::ValidationErrors;
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    SessionConflict(String),
    #[error("{0}")]
    NotPrintable(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Internal(String),
}

impl From<RepositoryError> for PortalError {
    fn from(err: RepositoryError) -> Self {
        PortalError::Lifecycle(LifecycleError::Repository(err))
    }
}

impl From<ValidationErrors> for PortalError {
    fn from(errors: ValidationErrors) -> Self {
        PortalError::Validation(errors)
    }
}

impl From<ApprovalError> for PortalError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::NotFound(_) => PortalError::NotFound(err.to_string()),
            ApprovalError::Conflict { .. } => PortalError::SessionConflict(err.to_string()),
            ApprovalError::NotEditing | ApprovalError::EditInProgress => {
                PortalError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<RecordSourceError> for PortalError {
    fn from(err: RecordSourceError) -> Self {
        match err {
            RecordSourceError::NotFound => PortalError::NotFound(err.to_string()),
            RecordSourceError::Unauthorized => PortalError::Unauthorized(err.to_string()),
            RecordSourceError::Transport(_) | RecordSourceError::Malformed(_) => {
                PortalError::Transport(err.to_string())
            }
        }
    }
}

impl PortalError {
    /// Error kind reported in the `error` field of the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            PortalError::Lifecycle(err) => match err {
                LifecycleError::IllegalTransition { .. } => "IllegalTransition",
                LifecycleError::CancellationRefused { .. } => "CancellationRefused",
                LifecycleError::Forbidden { .. } | LifecycleError::StaffOnly { .. } => "Forbidden",
                LifecycleError::Validation(_) => "ValidationError",
                LifecycleError::NotFound(_) => "NotFound",
                LifecycleError::Repository(_) => "TransportFailure",
            },
            PortalError::Validation(_) => "ValidationError",
            PortalError::Unauthorized(_) => "Unauthorized",
            PortalError::Forbidden(_) => "Forbidden",
            PortalError::NotFound(_) => "NotFound",
            PortalError::SessionConflict(_) => "SessionConflict",
            PortalError::NotPrintable(_) => "NotPrintable",
            PortalError::BadRequest(_) => "BadRequest",
            PortalError::Transport(_) => "TransportFailure",
            PortalError::Internal(_) => "InternalServerError",
        }
    }
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            "IllegalTransition" | "CancellationRefused" | "SessionConflict" | "NotPrintable" => {
                StatusCode::CONFLICT
            }
            "ValidationError" | "BadRequest" => StatusCode::BAD_REQUEST,
            "Unauthorized" => StatusCode::UNAUTHORIZED,
            "Forbidden" => StatusCode::FORBIDDEN,
            "NotFound" => StatusCode::NOT_FOUND,
            "TransportFailure" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}: {}", self.kind(), self);
        }
        let message = match self {
            PortalError::Validation(errors)
            | PortalError::Lifecycle(LifecycleError::Validation(errors)) => errors.to_message(),
            other => other.to_string(),
        };
        HttpResponse::build(status).json(ErrorResponse::new(self.kind(), &message))
    }
}
