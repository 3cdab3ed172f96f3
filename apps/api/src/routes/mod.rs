pub mod health;
pub mod request_id;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::screening::handlers as screening;
use crate::state::AppState;
use crate::workflow::handlers as workflow;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/criteria/options",
            get(screening::handle_criteria_options),
        )
        .route(
            "/api/v1/screenings",
            post(screening::handle_screen).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/screenings/evaluate",
            post(screening::handle_evaluate),
        )
        .route(
            "/api/v1/screenings/forward",
            post(workflow::handle_forward),
        )
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
