//! Error types for BookHaven server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes exposed in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    BadValue = 5,
    Duplicate = 6,
    LoanLimitExceeded = 7,
    DuplicateActiveLoan = 8,
    OutOfStock = 9,
    InsufficientCopies = 10,
    BookHasActiveLoans = 11,
    UserHasActiveLoans = 12,
    AlreadyReturned = 13,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Loan limit reached: {current} of {max} active loans")]
    LoanLimitExceeded { current: i64, max: i64 },

    #[error("An active loan for this book already exists; return it first")]
    DuplicateActiveLoan,

    #[error("No available copies: {currently_loaned} of {total_copies} on loan")]
    OutOfStock {
        total_copies: i32,
        currently_loaned: i64,
    },

    #[error("Cannot reduce total copies to {requested}: {currently_loaned} copies are currently on loan")]
    InsufficientCopiesForActiveLoans {
        requested: i32,
        currently_loaned: i64,
    },

    #[error("Cannot delete book: {currently_loaned} copies are currently on loan")]
    BookHasActiveLoans { currently_loaned: i64 },

    #[error("Cannot delete user: {active_loans} active loans outstanding")]
    UserHasActiveLoans { active_loans: i64 },

    #[error("Loan {0} is already returned")]
    AlreadyReturned(i32),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::LoanLimitExceeded { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::LoanLimitExceeded,
                self.to_string(),
            ),
            AppError::DuplicateActiveLoan => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::DuplicateActiveLoan,
                self.to_string(),
            ),
            AppError::OutOfStock { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::OutOfStock,
                self.to_string(),
            ),
            AppError::InsufficientCopiesForActiveLoans { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::InsufficientCopies,
                self.to_string(),
            ),
            AppError::BookHasActiveLoans { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BookHasActiveLoans,
                self.to_string(),
            ),
            AppError::UserHasActiveLoans { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::UserHasActiveLoans,
                self.to_string(),
            ),
            AppError::AlreadyReturned(_) => (
                StatusCode::CONFLICT,
                ErrorCode::AlreadyReturned,
                self.to_string(),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
