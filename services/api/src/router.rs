//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the chat endpoint and OpenAPI documentation.

use crate::{
    handlers,
    models::{ChatRequest, ChatResponse, ErrorResponse},
    state::AppState,
};

use axum::{Router, routing::post};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::chat),
    components(schemas(ChatRequest, ChatResponse, ErrorResponse)),
    tags(
        (name = "Amie API", description = "Turn-based chat with the Amie emotional companion")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/chat", post(handlers::chat))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
