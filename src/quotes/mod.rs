pub mod fetcher;
pub mod locale;
pub mod sources;

pub use fetcher::{HttpQuoteFetcher, QuoteSource};
pub use locale::{Locale, Message};
pub use sources::{Endpoint, Provider, SourceRegistry};

use thiserror::Error;

/// Why a single provider call did not yield a quote. Never leaves the
/// fetcher: every variant is absorbed into a backup quote.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response contained no quote text")]
    EmptyQuote,

    #[error("Unrecognised response shape")]
    UnknownShape,
}
