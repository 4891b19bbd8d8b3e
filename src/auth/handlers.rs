use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::accounts::{self, Registration};
use crate::auth::session;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// bcrypt is deliberately slow, keep it off the async workers.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?
}

/// POST /register — validate and create an account
pub async fn register(
    State(state): State<AppState>,
    Json(reg): Json<Registration>,
) -> AppResult<Response> {
    let pool = state.db.clone();
    let cost = state.config.auth.bcrypt_cost;
    let username = reg.username.clone();

    let user_id = blocking(move || Ok(accounts::register(&pool, &reg, cost)?)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user_id": user_id, "username": username })),
    )
        .into_response())
}

/// POST /login — check credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let pool = state.db.clone();
    let user = blocking(move || Ok(accounts::authenticate(&pool, &req.username, &req.password)?))
        .await?;

    let hours = state.config.auth.session_hours;
    let token = session::create_session(&state.db, &user.id, hours)?;
    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = session::session_cookie(&state.config.auth.cookie_name, &token, hours);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "user_id": user.id, "username": user.username })),
    )
        .into_response())
}

/// POST /logout — delete session and redirect
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;

    if let Some(token) = session::get_cookie_value(&headers, cookie_name) {
        if let Err(e) = session::delete_session(&state.db, token) {
            tracing::warn!("Failed to delete session: {}", e);
        }
    }

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, session::clear_cookie(cookie_name)),
        ],
        "",
    )
        .into_response())
}

/// GET /me — the logged-in account
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let account = accounts::find_by_id(&state.db, &user.id)?.ok_or(AppError::Unauthorized)?;
    Ok(Json(account).into_response())
}
