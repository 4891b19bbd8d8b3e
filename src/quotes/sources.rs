// Provider registry, backup quotes and per-provider response parsing
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::locale::Locale;
use super::FetchError;

/// Known response shapes. Each variant has its own parser; `Unknown`
/// endpoints are still called but always resolve to a backup quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Quotable,
    Favqs,
    Zenquotes,
    Forismatic,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub provider: Provider,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, provider: Provider) -> Self {
        Self {
            url: url.into(),
            provider,
        }
    }
}

/// A quote as returned by a provider, before formatting for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuote {
    pub body: String,
    pub author: Option<String>,
}

impl ParsedQuote {
    /// `"{body} — {author}"`, with the locale's unknown-author placeholder
    /// when the provider gave no usable author.
    pub fn display(&self, locale: Locale) -> String {
        let author = self
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| locale.unknown_author());
        format!("{} — {}", self.body.trim(), author)
    }
}

#[derive(Deserialize)]
struct QuotableBody {
    content: String,
    #[serde(default)]
    author: Option<String>,
}

#[derive(Deserialize)]
struct FavqsBody {
    quote: FavqsQuote,
}

#[derive(Deserialize)]
struct FavqsQuote {
    body: String,
    #[serde(default)]
    author: Option<String>,
}

#[derive(Deserialize)]
struct ZenquotesItem {
    q: String,
    #[serde(default)]
    a: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForismaticBody {
    quote_text: String,
    #[serde(default)]
    quote_author: Option<String>,
}

impl Provider {
    pub fn parse(&self, body: &[u8]) -> Result<ParsedQuote, FetchError> {
        let parsed = match self {
            Provider::Quotable => {
                let b: QuotableBody = serde_json::from_slice(body)?;
                ParsedQuote {
                    body: b.content,
                    author: b.author,
                }
            }
            Provider::Favqs => {
                let b: FavqsBody = serde_json::from_slice(body)?;
                ParsedQuote {
                    body: b.quote.body,
                    author: b.quote.author,
                }
            }
            Provider::Zenquotes => {
                let items: Vec<ZenquotesItem> = serde_json::from_slice(body)?;
                let first = items.into_iter().next().ok_or(FetchError::EmptyQuote)?;
                ParsedQuote {
                    body: first.q,
                    author: first.a,
                }
            }
            Provider::Forismatic => {
                let b: ForismaticBody = serde_json::from_slice(body)?;
                ParsedQuote {
                    body: b.quote_text,
                    author: b.quote_author,
                }
            }
            Provider::Unknown => return Err(FetchError::UnknownShape),
        };

        if parsed.body.trim().is_empty() {
            return Err(FetchError::EmptyQuote);
        }
        Ok(parsed)
    }
}

/// Candidate endpoints per locale.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    endpoints: HashMap<Locale, Vec<Endpoint>>,
}

impl SourceRegistry {
    pub fn builtin() -> Self {
        let mut endpoints = HashMap::new();
        endpoints.insert(
            Locale::En,
            vec![
                Endpoint::new("https://api.quotable.io/random", Provider::Quotable),
                Endpoint::new("https://favqs.com/api/qotd", Provider::Favqs),
                Endpoint::new("https://zenquotes.io/api/random", Provider::Zenquotes),
            ],
        );
        endpoints.insert(
            Locale::Ru,
            vec![
                Endpoint::new(
                    "https://api.forismatic.com/api/1.0/?method=getQuote&format=json&lang=ru",
                    Provider::Forismatic,
                ),
                Endpoint::new(
                    "https://programming-quotes-api.herokuapp.com/quotes/random",
                    Provider::Unknown,
                ),
                Endpoint::new(
                    "https://geek-jokes.sameerkumar.website/api?format=json",
                    Provider::Unknown,
                ),
            ],
        );
        Self { endpoints }
    }

    /// Built-in registry with whole per-locale lists replaced by `overrides`.
    pub fn with_overrides(overrides: &HashMap<Locale, Vec<Endpoint>>) -> Self {
        let mut registry = Self::builtin();
        for (locale, list) in overrides {
            registry.endpoints.insert(*locale, list.clone());
        }
        registry
    }

    pub fn endpoints(&self, locale: Locale) -> &[Endpoint] {
        self.endpoints
            .get(&locale)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Uniformly random endpoint for `locale`, `None` when the list is empty.
    pub fn pick<R: Rng + ?Sized>(&self, locale: Locale, rng: &mut R) -> Option<&Endpoint> {
        self.endpoints(locale).choose(rng)
    }
}

pub fn backup_quotes(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::En => &[
            "Stay hungry, stay foolish. — Steve Jobs",
            "The only way to do great work is to love what you do. — Steve Jobs",
            "Life is what happens when you're busy making other plans. — John Lennon",
        ],
        Locale::Ru => &[
            "Мысли позитивно — и мир станет лучше. — Неизвестный автор",
            "Код — это поэзия, а программист — поэт. — Анонимный разработчик",
            "Ошибки — это ступени к мастерству. — Мудрый программист",
        ],
    }
}

pub fn random_backup<R: Rng + ?Sized>(locale: Locale, rng: &mut R) -> String {
    let quotes = backup_quotes(locale);
    // Lists are static and non-empty
    quotes[rng.gen_range(0..quotes.len())].to_string()
}
