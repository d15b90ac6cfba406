pub mod challenges;
pub mod currently_reading;
pub mod middleware;
pub mod reading_log;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use middleware::require_identity;
pub use rest::{get_profile_handler, ApiDoc};
pub use state::AppState;

/// Builds every API route. All of them require a caller identity.
///
/// CORS and the Swagger UI are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/profile", get(get_profile_handler))
        .route(
            "/challenges",
            get(challenges::list_challenges_handler).post(challenges::create_challenge_handler),
        )
        .route(
            "/challenges/{id}",
            put(challenges::update_challenge_handler).delete(challenges::delete_challenge_handler),
        )
        .route(
            "/reading-log",
            get(reading_log::list_reading_log_handler)
                .post(reading_log::create_reading_log_handler),
        )
        .route(
            "/reading-log/{id}",
            put(reading_log::update_reading_log_handler)
                .delete(reading_log::delete_reading_log_handler),
        )
        .route(
            "/currently-reading",
            get(currently_reading::list_currently_reading_handler)
                .post(currently_reading::start_reading_handler),
        )
        .route(
            "/currently-reading/{book_id}",
            put(currently_reading::update_progress_handler)
                .delete(currently_reading::remove_currently_reading_handler),
        )
        .route(
            "/currently-reading/{book_id}/finish",
            post(currently_reading::finish_reading_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
