use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::auth::TokenError;
use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Too many requests, retry in {0} seconds")]
    TooManyRequests(u64),
    /// Internal detail; logged, never sent to the client.
    #[error("{0}")]
    ServerError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Internal detail of a server error, attached to the response for
/// [`log_errors`](crate::middleware::log_errors) to report.
#[derive(Debug, Clone)]
pub struct ServerErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, detail) = match self {
            AppError::ServerError(detail) => ("Server error".to_string(), Some(detail)),
            other => (other.to_string(), None),
        };

        let mut response = (status, Json(ErrorResponse { error })).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ServerErrorDetail(detail));
        }
        response
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConstraintViolation { column } => {
                AppError::Conflict(format!("A user with this {} already exists", column))
            }
            StoreError::NotFound => AppError::NotFound("Resource not found".into()),
            other => AppError::ServerError(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::from(err).into()
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::ServerError(format!("password hashing failed: {}", err))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret | TokenError::Signing(_) => {
                AppError::ServerError(err.to_string())
            }
            _ => AppError::Unauthorized("Invalid or expired token".into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {}", err.body_text());
        AppError::InvalidInput("Invalid input".into())
    }
}

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        tracing::debug!("Rejected path: {}", err.body_text());
        AppError::InvalidInput("Invalid path parameter".into())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages(&err, &mut messages);
        messages.sort();
        AppError::InvalidInput(messages.join("; "))
    }
}

// Walks nested structs (flattened request bodies) as well as plain fields.
fn collect_messages(err: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in err.errors() {
        match kind {
            ValidationErrorsKind::Field(errors) => {
                out.extend(errors.iter().map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_messages(nested, out);
                }
            }
        }
    }
}
