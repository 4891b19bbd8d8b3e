use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::VoteKind;
use crate::error::{AppError, AppResult};
use crate::extractors::{MaybeUser, PreferredLocale};
use crate::quotes::Message;
use crate::state::AppState;
use crate::votes;

#[derive(Deserialize)]
pub struct TallyQuery {
    pub quote: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vote", post(cast_vote))
        .route("/votes", get(tally))
}

/// `{"quote": "...", "vote": "like" | "dislike"}`, or `None` for anything else.
fn parse_vote(body: &[u8]) -> Option<(String, VoteKind)> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    let quote = payload.get("quote")?.as_str().filter(|q| !q.is_empty())?;
    let kind = payload.get("vote")?.as_str()?.parse::<VoteKind>().ok()?;
    Some((quote.to_string(), kind))
}

/// POST /vote — like or dislike a quote by its exact text
///
/// The body is read raw so a missing session is reported before any payload
/// problem, whatever the body or its content type.
async fn cast_vote(
    State(state): State<AppState>,
    PreferredLocale(locale): PreferredLocale,
    maybe_user: MaybeUser,
    body: Bytes,
) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": locale.message(Message::LoginRequired) })),
        )
            .into_response());
    };

    let Some((quote, kind)) = parse_vote(&body) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": locale.message(Message::InvalidRequest) })),
        )
            .into_response());
    };

    votes::vote(&state.db, &user.id, &quote, kind)?;

    Ok(Json(json!({ "message": locale.message(Message::VoteRecorded) })).into_response())
}

/// GET /votes?quote=... — like/dislike counts for a quote text
async fn tally(State(state): State<AppState>, Query(q): Query<TallyQuery>) -> AppResult<Response> {
    let quote = q
        .quote
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("quote is required".into()))?;

    let tally = votes::tally(&state.db, &quote)?;
    Ok(Json(tally).into_response())
}
