use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/start", post(handlers::start_sleep))
        .route("/end", post(handlers::end_sleep))
        .route("/summary", get(handlers::get_summary))
        .route("/active", get(handlers::get_active))
        .route("/manual-nap", post(handlers::add_manual_nap))
        .route("/nap/:id", put(handlers::update_nap).delete(handlers::delete_nap))
        .route("/clear-day", post(handlers::clear_day))
        .route("/stats", get(handlers::get_stats))
        .layer(cors)
        .with_state(state)
}
