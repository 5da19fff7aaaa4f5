//! Centralized Error Handling Module
//!
//! Every failure in the summarizer carries a unique error code plus a
//! user-facing message. Handlers show `message` verbatim; the code drives the
//! HTTP status and shows up in logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - API_xxx: request/auth errors
//! - INPUT_xxx: validation of user submissions
//! - ACCESS_xxx: model access grants
//! - AI_xxx: OpenAI failures
//! - CONTENT_xxx: URL fetching
//! - CFG_xxx: configuration
//! - DB_xxx: storage

use std::fmt;

use crate::utils::constants::MSG_UNEXPECTED;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message, safe to show to end users
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Missing or unknown API key
    ApiUnauthorized,
    /// Rate limit exceeded
    ApiRateLimited,

    // ============================================
    // Input Validation
    // ============================================
    /// Required field empty
    InputEmpty,
    /// Submitted text exceeds the configured limit
    InputTooLong,

    // ============================================
    // Access Control
    // ============================================
    /// User has no model grants at all
    AccessNoModels,
    /// Requested model is not granted to the user
    AccessModelDenied,

    // ============================================
    // AI Service
    // ============================================
    /// OpenAI rejected the API key
    AiAuthFailed,
    /// OpenAI rate limit (HTTP 429)
    AiRateLimited,
    /// Request parameters rejected (max_tokens family)
    AiModelConfig,
    /// Prompt exceeded the model's context window
    AiContextLength,
    /// OpenAI unreachable or returned a generic API error
    AiUnavailable,
    /// Completion came back empty
    AiEmptyResponse,
    /// Anything else from the AI call path
    AiUnexpected,

    // ============================================
    // Content Fetching
    // ============================================
    /// URL could not be fetched
    ContentFetchFailed,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Missing API key
    ConfigMissingApiKey,

    // ============================================
    // Storage Errors
    // ============================================
    /// Database failure
    DbError,
    /// Unique constraint hit
    DbConflict,
    /// User lookup failed
    UserNotFound,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // API Errors
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiRateLimited => "API_RATE_LIMITED",

            // Input
            Self::InputEmpty => "INPUT_EMPTY",
            Self::InputTooLong => "INPUT_TOO_LONG",

            // Access
            Self::AccessNoModels => "ACCESS_NO_MODELS",
            Self::AccessModelDenied => "ACCESS_MODEL_DENIED",

            // AI
            Self::AiAuthFailed => "AI_AUTH_FAILED",
            Self::AiRateLimited => "AI_RATE_LIMITED",
            Self::AiModelConfig => "AI_MODEL_CONFIG",
            Self::AiContextLength => "AI_CONTEXT_LENGTH",
            Self::AiUnavailable => "AI_UNAVAILABLE",
            Self::AiEmptyResponse => "AI_EMPTY_RESPONSE",
            Self::AiUnexpected => "AI_UNEXPECTED",

            // Content
            Self::ContentFetchFailed => "CONTENT_FETCH_FAILED",

            // Configuration Errors
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigMissingApiKey => "CFG_MISSING_API_KEY",

            // Storage
            Self::DbError => "DB_ERROR",
            Self::DbConflict => "DB_CONFLICT",
            Self::UserNotFound => "DB_USER_NOT_FOUND",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest
            | Self::InputEmpty
            | Self::InputTooLong
            | Self::AiContextLength
            | Self::ConfigInvalidValue => 400,
            Self::ApiUnauthorized => 401,
            Self::AccessNoModels | Self::AccessModelDenied => 403,
            Self::UserNotFound => 404,
            Self::DbConflict => 409,
            Self::ContentFetchFailed => 422,
            Self::ApiRateLimited | Self::AiRateLimited => 429,
            Self::AiAuthFailed | Self::AiModelConfig | Self::AiEmptyResponse => 502,
            Self::AiUnavailable => 503,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AiRateLimited
                | Self::AiUnavailable
                | Self::AiEmptyResponse
                | Self::ApiRateLimited
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Missing/invalid credentials
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::ApiUnauthorized, "Invalid or missing API key")
    }

    /// Required input missing
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InputEmpty, msg)
    }

    /// Input over the length limit
    pub fn too_long(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InputTooLong, msg)
    }

    /// URL fetch failed
    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ContentFetchFailed, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key, value),
        )
    }

    /// User lookup failed
    pub fn user_not_found(username: &str) -> Self {
        Self::new(
            ErrorCode::UserNotFound,
            format!("User \"{}\" does not exist", username),
        )
    }

    /// Generic failure whose details must not reach the user
    pub fn unexpected(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::with_source(ErrorCode::AiUnexpected, MSG_UNEXPECTED, source)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique {
            Self::with_source(ErrorCode::DbConflict, "Record already exists", err)
        } else {
            Self::with_source(ErrorCode::DbError, "Database error", err)
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::with_source(ErrorCode::DbError, "Database migration failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::empty_input("Please enter a valid URL.");
        assert_eq!(err.code, ErrorCode::InputEmpty);
        assert_eq!(err.code_str(), "INPUT_EMPTY");
        assert_eq!(err.to_string(), "[INPUT_EMPTY] Please enter a valid URL.");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::AiRateLimited.is_retryable());
        assert!(ErrorCode::AiUnavailable.is_retryable());
        assert!(!ErrorCode::AiAuthFailed.is_retryable());
        assert!(!ErrorCode::AccessModelDenied.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::InputTooLong.http_status(), 400);
        assert_eq!(ErrorCode::ApiUnauthorized.http_status(), 401);
        assert_eq!(ErrorCode::AccessModelDenied.http_status(), 403);
        assert_eq!(ErrorCode::AiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::AiUnavailable.http_status(), 503);
        assert_eq!(ErrorCode::DbError.http_status(), 500);
    }

    #[test]
    fn test_io_error_conversion() {
        fn write_report(out: &mut impl std::io::Write) -> AppResult<()> {
            writeln!(out, "report")?;
            Ok(())
        }
        let mut closed: &mut [u8] = &mut [];
        let err = write_report(&mut closed).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unknown);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unexpected_hides_details() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = AppError::unexpected(io);
        assert_eq!(err.message, MSG_UNEXPECTED);
        assert!(std::error::Error::source(&err).is_some());
    }
}
