//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling chat requests. It uses
//! `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Json, Response},
};
use amie_core::{DialogueEngine, TurnReply};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    models::{ChatRequest, ChatResponse, ErrorResponse},
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let error = "An internal server error occurred.".to_string();
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error }))
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Send one utterance to the companion and receive its reply.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply to the utterance", body = ChatResponse),
        (status = 400, description = "Missing or empty message", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("x-session-id" = Option<String>, Header, description = "Session UUID; omit to start a new session. Echoed back on every response.")
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = payload.message.as_deref().map(str::trim).unwrap_or("");
    if message.is_empty() {
        return Err(ApiError::BadRequest("No message provided".to_string()));
    }

    let session_id = match headers.get("x-session-id") {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| {
                ApiError::BadRequest("x-session-id header must be a valid UUID".to_string())
            })?,
        None => Uuid::new_v4(),
    };

    let reply = run_chat(&state, session_id, message).await?;

    Ok((
        StatusCode::OK,
        AppendHeaders([("x-session-id", session_id.to_string())]),
        Json(ChatResponse {
            response: reply.text,
        }),
    ))
}

/// Routes one message through the session's engine, creating the session on
/// first contact and retiring it once the engine reports the session ended.
pub(crate) async fn run_chat(
    state: &AppState,
    session_id: Uuid,
    message: &str,
) -> Result<TurnReply, ApiError> {
    let engine = {
        let mut sessions = state.sessions.lock().await;
        match sessions.get(&session_id) {
            Some(engine) => engine.clone(),
            None => {
                let profile = state.profile_store.load().await?;
                info!(%session_id, returning = profile.is_some(), "Starting new session");
                let engine = Arc::new(Mutex::new(DialogueEngine::new(
                    state.lexicon.clone(),
                    state.reply_gen.clone(),
                    state.profile_store.clone(),
                    state.engine_config.clone(),
                    profile,
                )));
                sessions.insert(session_id, engine.clone());
                engine
            }
        }
    };

    let reply = engine.lock().await.submit_turn(message).await;

    if reply.ended {
        info!(%session_id, "Session ended; retiring engine");
        state.sessions.lock().await.remove(&session_id);
    }

    Ok(reply)
}
