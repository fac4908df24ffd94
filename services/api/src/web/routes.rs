//! services/api/src/web/routes.rs
//!
//! Assembles the HTTP router: the REST endpoints, the HTTP timeouts, request
//! tracing and the Swagger UI.

use crate::web::{
    rest::{
        create_answer_handler, create_question_handler, delete_answer_handler,
        delete_question_handler, get_answer_handler, get_question_handler, health_handler,
        list_questions_handler, ApiDoc,
    },
    state::AppState,
};
use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router over the shared state.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let server = app_state.config.server.clone();

    // The slash-less forms are aliases of the collection routes.
    let api_router = Router::new()
        .route(
            "/questions/",
            get(list_questions_handler).post(create_question_handler),
        )
        .route(
            "/questions",
            get(list_questions_handler).post(create_question_handler),
        )
        .route(
            "/questions/{id}",
            get(get_question_handler).delete(delete_question_handler),
        )
        .route("/questions/{id}/answers/", post(create_answer_handler))
        .route("/questions/{id}/answers", post(create_answer_handler))
        .route(
            "/answers/{id}",
            get(get_answer_handler).delete(delete_answer_handler),
        )
        .route("/health", get(health_handler))
        .layer(RequestBodyTimeoutLayer::new(server.read_timeout))
        .layer(TimeoutLayer::new(server.write_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
