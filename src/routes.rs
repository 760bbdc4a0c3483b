// src/routes.rs

use axum::{
    Router, http::Method,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{certificate, quiz},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quizzes, certificates).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let quiz_routes = Router::new()
        // Admin routes
        .route("/", post(quiz::create_quiz))
        .route(
            "/{quiz_id}/questions",
            get(quiz::list_questions).post(quiz::add_question),
        )
        .route("/questions/{question_id}", delete(quiz::delete_question))
        // Shared routes
        .route("/material/{material_id}", get(quiz::get_quiz_status))
        // Learner routes
        .route("/submit", post(quiz::submit_quiz));

    let certificate_routes = Router::new().route(
        "/user/{user_id}/quiz/{quiz_id}",
        get(certificate::get_certificate),
    );

    Router::new()
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/certificates", certificate_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
