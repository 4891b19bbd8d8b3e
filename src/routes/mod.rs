pub mod auth;
pub mod history;
pub mod quotes;
pub mod votes;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(quotes::router())
        .merge(votes::router())
        .merge(history::router())
        .merge(auth::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
