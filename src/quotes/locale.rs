use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language used for quote sources, backup quotes and UI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ru,
}

/// Short UI strings returned alongside API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    QuoteUpdated,
    VoteRecorded,
    LoginRequired,
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ru];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// Author shown when a provider returns a quote without one.
    pub fn unknown_author(&self) -> &'static str {
        match self {
            Locale::En => "Unknown author",
            Locale::Ru => "Неизвестный автор",
        }
    }

    pub fn message(&self, message: Message) -> &'static str {
        match (self, message) {
            (Locale::En, Message::QuoteUpdated) => "Quote updated",
            (Locale::En, Message::VoteRecorded) => "Your vote has been recorded",
            (Locale::En, Message::LoginRequired) => "Please log in first",
            (Locale::En, Message::InvalidRequest) => "Invalid request",
            (Locale::Ru, Message::QuoteUpdated) => "Цитата обновлена",
            (Locale::Ru, Message::VoteRecorded) => "Ваш голос учтён",
            (Locale::Ru, Message::LoginRequired) => "Пожалуйста, войдите в систему",
            (Locale::Ru, Message::InvalidRequest) => "Некорректный запрос",
        }
    }

    /// Match a language tag such as `en`, `en-US` or `RU_ru` on its primary subtag.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str() == primary)
    }

    /// Best supported locale from an `Accept-Language` header value.
    ///
    /// Entries are weighted by their `q` parameter; among equal weights the
    /// earliest entry wins. Entries with `q=0` are never selected, and neither
    /// are entries whose `q` is not a number in `0..=1`.
    pub fn from_accept_language(header: &str) -> Option<Locale> {
        let mut best: Option<(Locale, f32)> = None;

        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let Some(locale) = parts.next().and_then(Locale::from_tag) else {
                continue;
            };
            let quality = match parts.find_map(|p| p.trim().strip_prefix("q=")) {
                None => 1.0,
                Some(q) => match q.trim().parse::<f32>() {
                    Ok(q) if q.is_finite() && (0.0..=1.0).contains(&q) => q,
                    _ => continue,
                },
            };

            if quality <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, q)| quality > q) {
                best = Some((locale, quality));
            }
        }

        best.map(|(locale, _)| locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

// Parsed from a plain string so locales also work as TOML table keys
impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
