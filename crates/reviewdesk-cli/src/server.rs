//! HTTP chat server: a static chat page plus a small JSON API over the answerer.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use reviewdesk_core::{AppContext, ChatTurn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const TITLE: &str = "Customer Support Assistant";
pub const DESCRIPTION: &str = "Ask me anything about the product. I'll search through customer reviews \
to help answer your questions about features, pricing, support, and more.";
pub const EXAMPLES: [&str; 7] = [
    "What do customers say about the pricing?",
    "How is the customer support rated?",
    "What integrations do users mention?",
    "Are there complaints about the mobile app?",
    "What do enterprise customers think?",
    "How easy is the onboarding process?",
    "What features do Project Managers like most?",
];

const CHAT_PAGE: &str = include_str!("../static/index.html");

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Routes:
/// - `GET /` chat page
/// - `GET /health`
/// - `GET /api/info` title, description and example questions
/// - `POST /api/chat` `{question, history}` → `{answer}`
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(chat_page))
        .route("/health", get(health))
        .route("/api/info", get(info))
        .route("/api/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

async fn health(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "documents": ctx.index.len(),
    }))
}

async fn info() -> impl IntoResponse {
    Json(json!({
        "title": TITLE,
        "description": DESCRIPTION,
        "examples": EXAMPLES,
    }))
}

async fn chat(State(ctx): State<Arc<AppContext>>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let answer = ctx.answerer.answer_question(&req.question, &req.history).await;
    Json(ChatResponse { answer })
}
