//! Axum router configuration with middleware.
//!
//! Routes live under `/api/`. Middleware: permissive CORS and request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/agent/chat", post(handlers::agent::chat))
        .route("/agent/stream", post(handlers::agent::stream))
        .route("/agent/reset", post(handlers::agent::reset))
        .route("/healthz", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .route("/", get(index))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/healthz
async fn health_check() -> &'static str {
    "ok"
}

/// GET / - plain-text endpoint listing.
async fn index() -> &'static str {
    concat!(
        "helpdesk-agent ",
        env!("CARGO_PKG_VERSION"),
        "\n\n",
        "POST /api/agent/chat    {\"message\": \"...\", \"model\": \"optional\"}\n",
        "POST /api/agent/stream  same body, text/event-stream reply\n",
        "POST /api/agent/reset   clear this session's history and memory\n",
        "GET  /api/healthz\n",
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;

    use helpdesk_core::llm::box_gateway::BoxModelGateway;
    use helpdesk_core::llm::gateway::ModelGateway;
    use helpdesk_core::tools::ToolError;
    use helpdesk_core::tools::fetch::{BoxPageFetcher, PageFetcher};
    use helpdesk_infra::sqlite::pool::DatabasePool;
    use helpdesk_infra::sqlite::session::SqliteSessionStore;
    use helpdesk_types::config::AppConfig;
    use helpdesk_types::llm::{CompletionRequest, LlmError, ModelReply, ToolCall};

    use super::*;

    /// Replays scripted replies, then echoes the last user message.
    #[derive(Clone, Default)]
    struct ScriptGateway {
        script: Arc<Mutex<VecDeque<Result<ModelReply, LlmError>>>>,
    }

    impl ScriptGateway {
        fn push(&self, reply: Result<ModelReply, LlmError>) {
            self.script.lock().unwrap().push_back(reply);
        }
    }

    impl ModelGateway for ScriptGateway {
        fn name(&self) -> &str {
            "script"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<ModelReply, LlmError> {
            if let Some(reply) = self.script.lock().unwrap().pop_front() {
                return reply;
            }
            let last = request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == helpdesk_types::llm::MessageRole::User)
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ModelReply::Final(format!("you said {last}")))
        }
    }

    struct OfflineFetcher;

    impl PageFetcher for OfflineFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, ToolError> {
            Err(ToolError::Fetch(format!("offline: {url}")))
        }
    }

    async fn test_app() -> (Router, ScriptGateway, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let data_dir = dir.path().to_path_buf();
        std::mem::forget(dir);
        let store = SqliteSessionStore::new(DatabasePool::new(&url).await.unwrap());

        let gateway = ScriptGateway::default();
        let state = AppState::from_parts(
            AppConfig::default(),
            data_dir,
            BoxModelGateway::new(gateway.clone()),
            BoxPageFetcher::new(OfflineFetcher),
            store,
        );
        (build_router(state.clone()), gateway, state)
    }

    fn post_json(uri: &str, sid: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/json");
        if let Some(sid) = sid {
            builder = builder.header(COOKIE, format!("sid={sid}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let (app, _, _) = test_app().await;
        let response = app
            .oneshot(Request::get("/api/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn test_chat_mints_cookie_and_replies() {
        let (app, _, _) = test_app().await;
        let response = app
            .oneshot(post_json("/api/agent/chat", None, json!({"message": "hi"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("sid="));
        assert!(cookie.contains("Max-Age=604800"));

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({"reply": "you said hi"}));
    }

    #[tokio::test]
    async fn test_chat_reuses_cookie_session() {
        let (app, _, state) = test_app().await;
        let response = app
            .oneshot(post_json("/api/agent/chat", Some("s1"), json!({"message": "hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[SET_COOKIE].to_str().unwrap(),
            "sid=s1; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );

        let history = state.controller.history(&"s1".parse().unwrap()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "you said hello");
    }

    #[tokio::test]
    async fn test_chat_missing_message() {
        let (app, _, _) = test_app().await;
        for body in [json!({}), json!({"message": "   "}), json!({"message": 42})] {
            let response = app
                .clone()
                .oneshot(post_json("/api/agent/chat", Some("s1"), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
            assert_eq!(body, json!({"error": "Missing message"}));
        }
    }

    #[tokio::test]
    async fn test_chat_gateway_failure_is_500() {
        let (app, gateway, _) = test_app().await;
        gateway.push(Err(LlmError::AuthenticationFailed));
        let response = app
            .oneshot(post_json("/api/agent/chat", Some("s1"), json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("authentication failed"));
    }

    #[tokio::test]
    async fn test_chat_reports_tools_and_memory() {
        let (app, gateway, _) = test_app().await;
        gateway.push(Ok(ModelReply::ToolRequest(vec![ToolCall {
            id: "c1".to_string(),
            name: "saveMemory".to_string(),
            arguments: json!({"key": "name", "value": "John"}),
        }])));
        gateway.push(Ok(ModelReply::Final("Nice to meet you, John.".to_string())));

        let response = app
            .oneshot(post_json(
                "/api/agent/chat",
                Some("s1"),
                json!({"message": "My name is John."}),
            ))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            body,
            json!({
                "reply": "Nice to meet you, John.",
                "tools_used": ["saveMemory"],
                "memory_delta": {"name": "John"}
            })
        );
    }

    #[tokio::test]
    async fn test_stream_frames() {
        let (app, _, _) = test_app().await;
        let response = app
            .oneshot(post_json("/api/agent/stream", Some("s1"), json!({"message": "a b"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");

        let body = body_string(response).await;
        let frames: Vec<Value> = body
            .split("\n\n")
            .filter_map(|frame| frame.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect();

        let text: String = frames
            .iter()
            .filter_map(|f| f["token"].as_str())
            .collect();
        assert_eq!(text, "you said a b");
        assert_eq!(frames.last().unwrap(), &json!({"done": true}));
    }

    #[tokio::test]
    async fn test_stream_missing_message_is_400() {
        let (app, _, _) = test_app().await;
        let response = app
            .oneshot(post_json("/api/agent/stream", Some("s1"), json!({"message": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stream_failure_is_single_error_frame() {
        let (app, gateway, _) = test_app().await;
        gateway.push(Err(LlmError::Timeout));
        let response = app
            .oneshot(post_json("/api/agent/stream", Some("s1"), json!({"message": "hi"})))
            .await
            .unwrap();
        let body = body_string(response).await;
        let frames: Vec<&str> = body
            .split("\n\n")
            .filter_map(|frame| frame.strip_prefix("data: "))
            .collect();
        assert_eq!(frames.len(), 1);
        let frame: Value = serde_json::from_str(frames[0]).unwrap();
        assert!(frame["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_reset_clears_session() {
        let (app, _, state) = test_app().await;
        app.clone()
            .oneshot(post_json("/api/agent/chat", Some("s1"), json!({"message": "hi"})))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::post("/api/agent/reset")
                    .header(COOKIE, "sid=s1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
        assert!(state.controller.history(&"s1".parse().unwrap()).await.unwrap().is_empty());
    }
}
