use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::auth::session;
use crate::error::AppError;
use crate::quotes::Locale;
use crate::state::AppState;

/// Cookie holding the visitor's chosen language.
pub const LANGUAGE_COOKIE: &str = "quotarium_lang";

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session::get_cookie_value(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        let (id, username) = session::lookup(&state.db, token)?.ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser { id, username })
    }
}

/// Optional user extractor — returns None instead of 401 when not authenticated.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(MaybeUser(None)),
            Err(e) => Err(e),
        }
    }
}

/// Locale implied by the request itself: language cookie, then
/// `Accept-Language`, then the configured default.
#[derive(Debug, Clone, Copy)]
pub struct PreferredLocale(pub Locale);

impl PreferredLocale {
    /// An explicit, supported tag from the request body wins over everything.
    pub fn or_requested(self, requested: Option<&str>) -> Locale {
        requested.and_then(Locale::from_tag).unwrap_or(self.0)
    }
}

impl FromRequestParts<AppState> for PreferredLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let from_cookie =
            session::get_cookie_value(&parts.headers, LANGUAGE_COOKIE).and_then(Locale::from_tag);

        let from_header = || {
            parts
                .headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|h| h.to_str().ok())
                .and_then(Locale::from_accept_language)
        };

        let locale = from_cookie
            .or_else(from_header)
            .unwrap_or(state.config.quotes.default_locale);
        Ok(PreferredLocale(locale))
    }
}
