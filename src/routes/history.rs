use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::HistoryEntry;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::history;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(list_history))
}

/// GET /history — the logged-in user's recent quotes, newest first
async fn list_history(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(history::list(&state.db, &user.id)?))
}
