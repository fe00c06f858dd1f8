// src/routes.rs

use axum::{
    Json, Router,
    http::Method,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers::quiz, state::AppState};

/// Assembles the main application router.
///
/// * Mounts the quiz flow under /quiz and a liveness route at /.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, agent handle).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/generate", post(quiz::generate_quiz))
        .route("/next", get(quiz::next_question))
        .route("/submit", post(quiz::submit_answer))
        .route("/finalize", post(quiz::finalize_quiz));

    Router::new()
        .route("/", get(root))
        .nest("/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Liveness message.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the AI-Powered Quiz Platform"
    }))
}
