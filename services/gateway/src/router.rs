use crate::handlers::{courts, matches, ws};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/courts", post(courts::create_court).get(courts::list_courts))
        .route(
            "/matches",
            post(matches::start_match).get(matches::active_matches),
        )
        .route("/matches/:id", get(matches::match_by_id))
        .route("/matches/:id/events", post(matches::point_event))
        .route("/matches/:id/undo", post(matches::undo_last_event))
        .route("/scoreboard", get(matches::scoreboard))
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
