//! Shared fixtures: stub OpenAI + web servers and a wired-up router

#![allow(dead_code)]

use ai_summarizer::api::{create_router, AppState};
use ai_summarizer::models::{AppConfig, Cost, ModelCosts, NewUser, OpenAiConfig, User};
use ai_summarizer::Database;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub type RequestLog = Arc<Mutex<Vec<Value>>>;

pub const SUMMARY_REPLY: &str = "  A short summary.  ";

/// Serve `app` on an ephemeral port, returning its base URL
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn completion(content: &str) -> Json<Value> {
    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    }))
}

/// Replies are keyed on the requested model name
async fn chat_completions(State(log): State<RequestLog>, Json(body): Json<Value>) -> Response {
    log.lock().unwrap().push(body.clone());
    match body["model"].as_str().unwrap_or_default() {
        "empty-model" => completion("   ").into_response(),
        "nochoice-model" => Json(json!({"id": "chatcmpl-test", "choices": []})).into_response(),
        "garbage-model" => (StatusCode::OK, "not json").into_response(),
        "limited-model" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"message": "Rate limit reached"}})),
        )
            .into_response(),
        "gpt-4" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {
                "message": "Unsupported parameter: 'max_tokens' is not supported with this model.",
                "param": "max_tokens"
            }})),
        )
            .into_response(),
        _ => completion(SUMMARY_REPLY).into_response(),
    }
}

async fn list_models() -> Json<Value> {
    Json(json!({"object": "list", "data": [{"id": "gpt-4o"}, {"id": "gpt-5-nano"}]}))
}

/// Stub OpenAI API. Returns its base URL and the log of chat request bodies.
pub async fn spawn_openai() -> (String, RequestLog) {
    let log: RequestLog = Arc::default();
    let app = Router::new()
        .route("/chat/completions", post(chat_completions))
        .route("/models", get(list_models))
        .with_state(log.clone());
    (spawn_server(app).await, log)
}

pub const PAGE_HTML: &str = r#"<html>
<head><title>Test Page</title><script>var hidden = "script text";</script></head>
<body><h1>Heading</h1><p>Visible paragraph.</p></body>
</html>"#;

/// Stub website with one page at `/article`
pub async fn spawn_website() -> String {
    let app = Router::new().route(
        "/article",
        get(|| async { axum::response::Html(PAGE_HTML) }),
    );
    spawn_server(app).await
}

pub fn zero_costs(input: &str) -> ModelCosts {
    ModelCosts {
        input: input.parse().unwrap(),
        cached_input: None,
        output: Some(Cost::from_micros(1_000_000)),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub db: Database,
    pub openai_log: RequestLog,
    pub web_base: String,
    pub media: TempDir,
}

pub struct TestUser {
    pub user: User,
    pub key: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build the app against fresh stubs; `tweak` adjusts the config first
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let (openai_url, openai_log) = spawn_openai().await;
        let web_base = spawn_website().await;
        let media = tempfile::tempdir().unwrap();

        let mut config = AppConfig {
            media_root: media.path().to_path_buf(),
            openai: OpenAiConfig {
                api_key: Some("sk-test".to_string()),
                base_url: openai_url,
                timeout: Duration::from_secs(5),
            },
            rate_limit: 1_000,
            ..AppConfig::default()
        };
        tweak(&mut config);

        let db = Database::in_memory().await.unwrap();
        let state = Arc::new(AppState::new(config, db.clone()).unwrap());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            db,
            openai_log,
            web_base,
            media,
        }
    }

    /// Create a user holding grants for `models` (created on demand)
    pub async fn user_with_models(&self, username: &str, models: &[&str]) -> TestUser {
        let (user, key) = self.db.create_user(&NewUser::new(username)).await.unwrap();
        let mut priced = Vec::new();
        for name in models {
            let (model, _) = self
                .db
                .get_or_create_model(name, &zero_costs("2.50"))
                .await
                .unwrap();
            priced.push(model);
        }
        self.db.assign_models(&user, &priced).await.unwrap();
        TestUser { user, key }
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.openai_log.lock().unwrap().clone()
    }

    /// Send one request through the router
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "summarizer.test");
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    /// POST a raw (possibly malformed) JSON body
    pub async fn post_raw(&self, uri: &str, key: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("host", "summarizer.test")
            .header("x-api-key", key)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Raw body for non-JSON responses (served media)
    pub async fn get_raw(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}
