/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; engine errors convert through
/// `From<AssignmentError>`.
///
/// Every error is rendered as:
///
/// ```json
/// { "error": { "code": "PR_MERGED", "message": "Pull request already merged: pr-1" } }
/// ```

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prroster_shared::assignment::AssignmentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    Unauthorized,
    NotFound,
    TeamExists,
    PrExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    TeamCompatibility,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::TeamExists => "TEAM_EXISTS",
            ErrorCode::PrExists => "PR_EXISTS",
            ErrorCode::PrMerged => "PR_MERGED",
            ErrorCode::NotAssigned => "NOT_ASSIGNED",
            ErrorCode::NoCandidate => "NO_CANDIDATE",
            ErrorCode::TeamCompatibility => "TEAM_COMPATIBILITY",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest { code: ErrorCode, message: String },

    /// Request body or query failed validation (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Missing or wrong admin token (401)
    Unauthorized(String),

    /// Referenced resource does not exist (404)
    NotFound(String),

    /// Request conflicts with current state (409)
    Conflict { code: ErrorCode, message: String },

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (e.g. "NOT_FOUND", "PR_MERGED")
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Shorthand for a 400 INVALID_REQUEST
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: ErrorCode::InvalidRequest,
            message: message.into(),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::BadRequest { code, .. } | ApiError::Conflict { code, .. } => *code,
            ApiError::ValidationError(_) => ErrorCode::InvalidRequest,
            ApiError::Unauthorized(_) => ErrorCode::Unauthorized,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::InternalError(_) => ErrorCode::InternalError,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest { message, .. } => write!(f, "Bad request: {}", message),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::BadRequest { message, .. } | ApiError::Conflict { message, .. } => (message, None),
            ApiError::ValidationError(errors) => ("Request validation failed".to_string(), Some(errors)),
            ApiError::Unauthorized(msg) | ApiError::NotFound(msg) => (msg, None),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        });

        (status, body).into_response()
    }
}

/// Convert engine errors to API errors
impl From<AssignmentError> for ApiError {
    fn from(err: AssignmentError) -> Self {
        let message = err.to_string();
        match err {
            AssignmentError::UserNotFound(_)
            | AssignmentError::TeamNotFound(_)
            | AssignmentError::PullRequestNotFound(_) => ApiError::NotFound(message),
            AssignmentError::TeamAlreadyExists(_) => ApiError::BadRequest {
                code: ErrorCode::TeamExists,
                message,
            },
            AssignmentError::PullRequestAlreadyExists(_) => ApiError::Conflict {
                code: ErrorCode::PrExists,
                message,
            },
            AssignmentError::PullRequestMerged(_) => ApiError::Conflict {
                code: ErrorCode::PrMerged,
                message,
            },
            AssignmentError::ReviewerNotAssigned { .. } => ApiError::Conflict {
                code: ErrorCode::NotAssigned,
                message,
            },
            AssignmentError::NoAvailableReviewer(_) => ApiError::Conflict {
                code: ErrorCode::NoCandidate,
                message,
            },
            AssignmentError::TeamCompatibility { .. } => ApiError::Conflict {
                code: ErrorCode::TeamCompatibility,
                message,
            },
            AssignmentError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::InternalError(format!("Database error: {}", err))
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        if details.is_empty() {
            // Nested member errors are not reported by field_errors()
            details.push(ValidationErrorDetail {
                field: "request".to_string(),
                message: errors.to_string(),
            });
        }

        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

/// Malformed or mistyped JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

/// Missing or mistyped query parameters
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::invalid_request("Invalid input");
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_error_code_serializes_like_as_str() {
        for code in [
            ErrorCode::InvalidRequest,
            ErrorCode::NotFound,
            ErrorCode::PrMerged,
            ErrorCode::NoCandidate,
            ErrorCode::TeamCompatibility,
            ErrorCode::InternalError,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.as_str().to_string()));
        }
    }

    #[test]
    fn test_assignment_error_mapping() {
        let cases = [
            (AssignmentError::UserNotFound("u1".into()), StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (AssignmentError::TeamNotFound("t".into()), StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (AssignmentError::PullRequestNotFound("p".into()), StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (AssignmentError::TeamAlreadyExists("t".into()), StatusCode::BAD_REQUEST, ErrorCode::TeamExists),
            (AssignmentError::PullRequestAlreadyExists("p".into()), StatusCode::CONFLICT, ErrorCode::PrExists),
            (AssignmentError::PullRequestMerged("p".into()), StatusCode::CONFLICT, ErrorCode::PrMerged),
            (
                AssignmentError::ReviewerNotAssigned {
                    pull_request_id: "p".into(),
                    user_id: "u".into(),
                },
                StatusCode::CONFLICT,
                ErrorCode::NotAssigned,
            ),
            (AssignmentError::NoAvailableReviewer("p".into()), StatusCode::CONFLICT, ErrorCode::NoCandidate),
            (
                AssignmentError::TeamCompatibility {
                    team_name: "t".into(),
                    user_ids: vec!["x".into()],
                },
                StatusCode::CONFLICT,
                ErrorCode::TeamCompatibility,
            ),
            (
                AssignmentError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status(), status, "{api}");
            assert_eq!(api.code(), code, "{api}");
        }
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "team_name".to_string(),
                message: "Team name must not be empty".to_string(),
            },
            ValidationErrorDetail {
                field: "members".to_string(),
                message: "Invalid member".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = ApiError::InternalError("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
