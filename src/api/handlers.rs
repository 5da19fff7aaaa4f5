//! API Request Handlers

use axum::{
    async_trait,
    extract::{FromRequest, Json, Request, State},
    http::{HeaderMap, StatusCode},
    Extension,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::middleware::{CurrentUser, RateLimitConfig, RateLimiter};
use super::types::*;
use crate::core::{ApiParams, BlogService, ContentProcessor, SummaryService};
use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{PricedModel, User};
use crate::providers::openai::OpenAiClient;
use crate::storage::Database;
use crate::utils::constants::{
    APP_NAME, APP_VERSION, MSG_BLOG_CREATED, MSG_EMPTY_TEXT, MSG_EMPTY_URL, MSG_MODEL_NOT_AVAILABLE,
    MSG_NO_MODELS, TEXT_SYSTEM_MESSAGE,
};

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub summarizer: SummaryService,
    pub blog: BlogService,
    pub config: AppConfig,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> AppResult<Self> {
        let openai = OpenAiClient::new(&config.openai)?;
        let params = ApiParams::new(config.families.clone(), config.api_defaults.clone());
        let content = ContentProcessor::new(config.limits.clone())?;

        let summarizer = SummaryService::new(openai.clone(), params, content);
        let blog = BlogService::new(openai, config.blog_model.clone(), config.blogs_dir());
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            requests_per_window: config.rate_limit,
            window_duration: config.rate_window,
        }));

        Ok(Self {
            db,
            summarizer,
            blog,
            config,
            rate_limiter,
            start_time: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ErrorReply = (StatusCode, Json<ApiResponse<()>>);
type HandlerResult<T> = Result<Json<ApiResponse<T>>, ErrorReply>;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Turn an `AppError` into the error envelope, status taken from its code
pub(super) fn error_reply(err: &AppError, start: Instant) -> ErrorReply {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(code = err.code_str(), error = %err, "Request failed");
    } else {
        warn!(code = err.code_str(), error = %err, "Request rejected");
    }
    (status, Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))))
}

fn respond<T: serde::Serialize>(result: AppResult<T>, start: Instant) -> HandlerResult<T> {
    match result {
        Ok(data) => Ok(Json(ApiResponse::success(data, elapsed_ms(start)))),
        Err(err) => Err(error_reply(&err, start)),
    }
}

/// `Json` body extractor whose rejections use the error envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ErrorReply;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let start = Instant::now();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(error_reply(
                &AppError::bad_request(rejection.body_text()),
                start,
            )),
        }
    }
}

fn names(models: &[PricedModel]) -> Vec<String> {
    models.iter().map(|m| m.name.clone()).collect()
}

/// Assigned models plus the model this request will use.
/// Fails when the user has no grants or asked for a model outside them.
async fn resolve_model(
    state: &AppState,
    user: &User,
    requested: Option<&str>,
) -> AppResult<(Vec<PricedModel>, String)> {
    let models = state.db.assigned_models(user).await?;
    let Some(first) = models.first() else {
        warn!(user = %user.username, "No models assigned");
        return Err(AppError::new(ErrorCode::AccessNoModels, MSG_NO_MODELS));
    };

    let selected = requested
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(first.name.as_str())
        .to_string();

    if !state.db.user_has_model(user, &selected).await? {
        warn!(user = %user.username, model = %selected, "Unauthorized model attempt");
        return Err(AppError::new(
            ErrorCode::AccessModelDenied,
            MSG_MODEL_NOT_AVAILABLE,
        ));
    }

    Ok((models, selected))
}

// ============================================
// Index & Health
// ============================================

pub async fn index() -> Json<ApiResponse<IndexData>> {
    let start = Instant::now();
    let data = IndexData {
        name: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        endpoints: vec![
            "GET  /v1/health",
            "GET  /v1/summary",
            "POST /v1/summary",
            "GET  /v1/url-summary",
            "POST /v1/url-summary",
            "GET  /v1/profile",
            "POST /v1/create-blog",
            "GET  /media/blogs/{file}",
        ],
    };
    Json(ApiResponse::success(data, elapsed_ms(start)))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let (status, database) = match state.db.ping().await {
        Ok(()) => ("healthy", "connected"),
        Err(e) => {
            error!("Health check database probe failed: {}", e);
            ("degraded", "unreachable")
        }
    };

    let data = HealthData {
        status: status.to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        database: database.to_string(),
    };
    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Text Summary
// ============================================

async fn summary_form_data(state: &AppState, user: &User) -> AppResult<SummaryFormData> {
    let models = state.db.assigned_models(user).await?;
    let message = if models.is_empty() {
        warn!(user = %user.username, "No models assigned");
        Some(MSG_NO_MODELS.to_string())
    } else {
        None
    };
    Ok(SummaryFormData {
        selected_model: models.first().map(|m| m.name.clone()),
        models: names(&models),
        message,
    })
}

pub async fn summary_form(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> HandlerResult<SummaryFormData> {
    let start = Instant::now();
    respond(summary_form_data(&state, &user).await, start)
}

async fn text_summary(
    state: &AppState,
    user: &User,
    req: &SummaryRequest,
) -> AppResult<SummaryData> {
    let (models, selected) = resolve_model(state, user, req.model.as_deref()).await?;

    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::empty_input(MSG_EMPTY_TEXT));
    }

    info!(
        user = %user.username,
        text_length = text.chars().count(),
        model = %selected,
        "📥 Summarization request"
    );
    let summary = state
        .summarizer
        .summarize_text(text, &selected, TEXT_SYSTEM_MESSAGE)
        .await?;
    info!(user = %user.username, "✅ Summarization succeeded");

    Ok(SummaryData {
        models: names(&models),
        selected_model: selected,
        summary,
    })
}

pub async fn summarize_text(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiJson(req): ApiJson<SummaryRequest>,
) -> HandlerResult<SummaryData> {
    let start = Instant::now();
    respond(text_summary(&state, &user, &req).await, start)
}

// ============================================
// URL Summary
// ============================================

pub async fn url_summary_form(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> HandlerResult<SummaryFormData> {
    let start = Instant::now();
    respond(summary_form_data(&state, &user).await, start)
}

async fn url_summary(
    state: &AppState,
    user: &User,
    req: &UrlSummaryRequest,
) -> AppResult<UrlSummaryData> {
    let (models, selected) = resolve_model(state, user, req.model.as_deref()).await?;

    let url = req.url.trim();
    if url.is_empty() {
        return Err(AppError::empty_input(MSG_EMPTY_URL));
    }

    info!(
        user = %user.username,
        url = %url,
        model = %selected,
        "📥 URL summarization request"
    );
    let summary = state.summarizer.summarize_url(url, &selected).await?;
    info!(user = %user.username, "✅ URL summarization succeeded");

    Ok(UrlSummaryData {
        models: names(&models),
        selected_model: selected,
        url: url.to_string(),
        summary,
    })
}

pub async fn summarize_url(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiJson(req): ApiJson<UrlSummaryRequest>,
) -> HandlerResult<UrlSummaryData> {
    let start = Instant::now();
    respond(url_summary(&state, &user, &req).await, start)
}

// ============================================
// Profile
// ============================================

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> HandlerResult<ProfileData> {
    let start = Instant::now();
    let result = state
        .db
        .assigned_models(&user)
        .await
        .map(|models| ProfileData {
            is_superuser: user.is_superuser,
            models,
            user,
        });
    respond(result, start)
}

// ============================================
// Blog
// ============================================

/// Public base URL of this request, from `Host` and `X-Forwarded-Proto`
fn request_base_url(headers: &HeaderMap, config: &AppConfig) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    match headers.get("host").and_then(|v| v.to_str().ok()) {
        Some(host) => format!("{}://{}", scheme, host),
        None => format!("{}://{}:{}", scheme, config.host, config.port),
    }
}

pub async fn create_blog(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateBlogRequest>,
) -> HandlerResult<CreateBlogData> {
    let start = Instant::now();
    let base_url = request_base_url(&headers, &state.config);
    let source_url = req.source_url.unwrap_or_default();

    let result = state
        .blog
        .create_blog(&user.username, &req.summary, &source_url, &base_url)
        .await
        .map(|post| CreateBlogData {
            blog_url: post.url,
            message: MSG_BLOG_CREATED.to_string(),
        });

    respond(result, start)
}
