/// Error types for Posts Service
///
/// Domain failures carry an [`ErrorCode`] from a closed set; each code owns
/// its wire key and message so every error body has the same shape:
/// a single lower-case key mapped to a human-readable message.
use crate::db::StoreError;
use crate::validators::{self, FieldErrors};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result type for posts-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    PostNotFound,
    CommentNotExists,
    NotAuthorized,
    AlreadyLiked,
    NotLiked,
    Internal,
}

impl ErrorCode {
    pub fn key(self) -> &'static str {
        match self {
            ErrorCode::PostNotFound => "postnotfound",
            ErrorCode::CommentNotExists => "commentnotexists",
            ErrorCode::NotAuthorized => "notauthorized",
            ErrorCode::AlreadyLiked => "alreadyliked",
            ErrorCode::NotLiked => "notliked",
            ErrorCode::Internal => "internal",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::PostNotFound => "No post found",
            ErrorCode::CommentNotExists => "Comment not found",
            ErrorCode::NotAuthorized => "User not authorized",
            ErrorCode::AlreadyLiked => "User already liked this post",
            ErrorCode::NotLiked => "You have not liked this post",
            ErrorCode::Internal => "Internal server error",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0:?}")]
    Validation(FieldErrors),

    #[error("Not found: {}", .0.message())]
    NotFound(ErrorCode),

    #[error("Unauthorized: {}", .0.message())]
    Unauthorized(ErrorCode),

    #[error("Conflict: {}", .0.message())]
    Conflict(ErrorCode),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AppError::Validation(_) => None,
            AppError::NotFound(code) | AppError::Unauthorized(code) | AppError::Conflict(code) => {
                Some(*code)
            }
            AppError::Store(_) => Some(ErrorCode::Internal),
        }
    }

    /// Low-cardinality label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Store(_) => "store_error",
        }
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        match self {
            AppError::Validation(fields) => {
                for (field, message) in fields {
                    body.insert(field.clone(), Value::String(message.clone()));
                }
            }
            _ => {
                let code = self.code().unwrap_or(ErrorCode::Internal);
                body.insert(code.key().to_string(), Value::String(code.message().to_string()));
            }
        }
        Value::Object(body)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // alreadyliked / notliked have always been answered with a 400
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Store(err) = self {
            tracing::error!(error = %err, "post store failure");
        }

        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(validators::field_errors(&errors))
    }
}
