//! Agent endpoints.
//!
//! - `POST /api/agent/chat`   -- buffered exchange, JSON result
//! - `POST /api/agent/stream` -- same exchange delivered as SSE `data:` frames
//! - `POST /api/agent/reset`  -- erase the session's history and memory

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use serde::Deserialize;

use helpdesk_core::chat::controller::MISSING_MESSAGE;

use crate::http::error::AppError;
use crate::http::session_cookie::SessionCookie;
use crate::state::AppState;

/// Body of the chat and stream endpoints.
#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub message: String,
    /// Overrides the configured default model for this exchange.
    #[serde(default)]
    pub model: Option<String>,
}

/// A body that is not a JSON object with a string `message` is treated the
/// same as an empty message.
fn parse_body(body: Result<Json<AgentRequest>, JsonRejection>) -> Result<AgentRequest, AppError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable agent request body");
            Err(AppError::Validation(MISSING_MESSAGE.to_string()))
        }
    }
}

/// POST /api/agent/chat
pub async fn chat(
    State(state): State<AppState>,
    session: SessionCookie,
    body: Result<Json<AgentRequest>, JsonRejection>,
) -> Response {
    let cookie = session.set_cookie();
    let result = async {
        let request = parse_body(body)?;
        let result = state
            .controller
            .handle(&session.id, &request.message, request.model.as_deref())
            .await?;
        Ok::<_, AppError>(Json(result))
    }
    .await;

    match result {
        Ok(json) => (cookie, json).into_response(),
        Err(err) => (cookie, err).into_response(),
    }
}

/// POST /api/agent/stream
///
/// Validation failures are answered with a plain 400 before the stream
/// opens. Failures after that arrive as a single `{"error": ...}` frame.
pub async fn stream(
    State(state): State<AppState>,
    session: SessionCookie,
    body: Result<Json<AgentRequest>, JsonRejection>,
) -> Response {
    let cookie = session.set_cookie();
    let request = match parse_body(body) {
        Ok(request) if !request.message.trim().is_empty() => request,
        Ok(_) => {
            return (cookie, AppError::Validation(MISSING_MESSAGE.to_string())).into_response();
        }
        Err(err) => return (cookie, err).into_response(),
    };

    let events = state
        .controller
        .handle_streaming(session.id, request.message, request.model)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.to_json())));

    let sse = Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)));
    (cookie, sse).into_response()
}

/// POST /api/agent/reset
pub async fn reset(State(state): State<AppState>, session: SessionCookie) -> Response {
    let cookie = session.set_cookie();
    match state.controller.reset(&session.id).await {
        Ok(()) => (cookie, "ok").into_response(),
        Err(err) => (cookie, AppError::from(err)).into_response(),
    }
}
