//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::errors::AppError;
use crate::models::types::{PricedModel, User};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: err.code.is_retryable().then(|| "retryable".to_string()),
        }
    }
}

// ============================================
// Index / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct IndexData {
    pub name: String,
    pub version: String,
    pub endpoints: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: String,
}

// ============================================
// Summaries
// ============================================

/// GET /v1/summary and GET /v1/url-summary
#[derive(Debug, Serialize)]
pub struct SummaryFormData {
    pub models: Vec<String>,
    pub selected_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryData {
    pub models: Vec<String>,
    pub selected_model: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlSummaryRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlSummaryData {
    pub models: Vec<String>,
    pub selected_model: String,
    pub url: String,
    pub summary: String,
}

// ============================================
// Profile
// ============================================

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub user: User,
    pub models: Vec<PricedModel>,
    pub is_superuser: bool,
}

// ============================================
// Blog
// ============================================

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateBlogData {
    pub blog_url: String,
    pub message: String,
}
