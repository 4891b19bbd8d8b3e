use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::session;
use crate::error::AppResult;
use crate::extractors::{MaybeUser, PreferredLocale, LANGUAGE_COOKIE};
use crate::history;
use crate::quotes::{Locale, Message};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct NewQuoteRequest {
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub quote: String,
    pub locale: Locale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(current_quote))
        .route("/new-quote", post(new_quote))
        .route("/change-language/{language}", get(change_language))
}

/// GET / — a quote in the visitor's preferred language
async fn current_quote(
    State(state): State<AppState>,
    PreferredLocale(locale): PreferredLocale,
) -> Json<QuoteResponse> {
    let quote = state.quotes.fetch(locale).await;
    Json(QuoteResponse {
        quote,
        locale,
        message: None,
    })
}

/// POST /new-quote — fetch a fresh quote, recording it for logged-in users
async fn new_quote(
    State(state): State<AppState>,
    preferred: PreferredLocale,
    maybe_user: MaybeUser,
    body: Option<Json<NewQuoteRequest>>,
) -> AppResult<Json<QuoteResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let locale = preferred.or_requested(req.language.as_deref());

    let quote = state.quotes.fetch(locale).await;

    if let Some(user) = maybe_user.0 {
        history::record(&state.db, &user.id, &quote)?;
    }

    Ok(Json(QuoteResponse {
        quote,
        locale,
        message: Some(locale.message(Message::QuoteUpdated)),
    }))
}

/// GET /change-language/{language} — remember the language, then go back
async fn change_language(Path(language): Path<String>, headers: HeaderMap) -> Response {
    let back = headers
        .get(header::REFERER)
        .and_then(|h| h.to_str().ok())
        .filter(|r| !r.is_empty())
        .unwrap_or("/")
        .to_string();

    match Locale::from_tag(&language) {
        Some(locale) => (
            StatusCode::SEE_OTHER,
            [
                (header::LOCATION, back),
                (
                    header::SET_COOKIE,
                    session::session_cookie(LANGUAGE_COOKIE, locale.as_str(), 24 * 365),
                ),
            ],
        )
            .into_response(),
        None => (StatusCode::SEE_OTHER, [(header::LOCATION, back)]).into_response(),
    }
}
