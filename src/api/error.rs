use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::services::{AuthError, EquipmentError, MovementError, UserError};

/// One itemized request-shape failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Closed error taxonomy. Every variant carries a stable machine-readable
/// code next to the human message, so clients branch on `code`, never on
/// message substrings.
#[derive(Debug)]
pub enum ApiError {
    /// Missing entity — uniformly 404.
    NotFound { code: &'static str, message: String },

    /// Business-rule violation (duplicate serial/login, illegal transition).
    BusinessRule { code: &'static str, message: String },

    /// Request-shape validation, itemized per field.
    Validation(Vec<FieldError>),

    Unauthorized { code: &'static str, message: String },

    Forbidden { message: String },

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { message, .. } => write!(f, "Not found: {}", message),
            ApiError::BusinessRule { message, .. } => write!(f, "Rejected: {}", message),
            ApiError::Validation(details) => {
                write!(f, "Validation failed ({} fields)", details.len())
            }
            ApiError::Unauthorized { message, .. } => write!(f, "Unauthorized: {}", message),
            ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message, None),
            ApiError::BusinessRule { code, message } => {
                (StatusCode::BAD_REQUEST, code, message, None)
            }
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION",
                "Erro de validação".to_string(),
                Some(details),
            ),
            ApiError::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, code, message, None)
            }
            ApiError::Forbidden { message } => (StatusCode::FORBIDDEN, "FORBIDDEN", message, None),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Erro interno do servidor".to_string(),
                    None,
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Erro interno do servidor".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: message,
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    pub fn validation(details: Vec<FieldError>) -> Self {
        ApiError::Validation(details)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        match err {
            AuthError::MissingCredentials => ApiError::BusinessRule {
                code,
                message: err.to_string(),
            },
            AuthError::InvalidCredentials
            | AuthError::Deactivated
            | AuthError::TokenMissing
            | AuthError::InvalidToken
            | AuthError::ExpiredToken => ApiError::Unauthorized {
                code,
                message: err.to_string(),
            },
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let code = err.code();
        match err {
            UserError::NotFound => ApiError::NotFound {
                code,
                message: err.to_string(),
            },
            UserError::DuplicateLogin => ApiError::BusinessRule {
                code,
                message: err.to_string(),
            },
            UserError::Database(msg) => ApiError::DatabaseError(msg),
            UserError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<EquipmentError> for ApiError {
    fn from(err: EquipmentError) -> Self {
        let code = err.code();
        match err {
            EquipmentError::NotFound | EquipmentError::OwnerNotFound => ApiError::NotFound {
                code,
                message: err.to_string(),
            },
            EquipmentError::DuplicateSerial | EquipmentError::DuplicateSerialInUse => {
                ApiError::BusinessRule {
                    code,
                    message: err.to_string(),
                }
            }
            EquipmentError::Database(msg) => ApiError::DatabaseError(msg),
            EquipmentError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<MovementError> for ApiError {
    fn from(err: MovementError) -> Self {
        let code = err.code();
        match err {
            MovementError::EquipmentNotFound | MovementError::UserNotFound => ApiError::NotFound {
                code,
                message: err.to_string(),
            },
            MovementError::EquipmentDiscarded | MovementError::WrongStatus { .. } => {
                ApiError::BusinessRule {
                    code,
                    message: err.to_string(),
                }
            }
            MovementError::Database(msg) => ApiError::DatabaseError(msg),
            MovementError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}
