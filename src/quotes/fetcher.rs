use async_trait::async_trait;

use super::locale::Locale;
use super::sources::{random_backup, Endpoint, SourceRegistry};
use super::FetchError;
use crate::config::QuotesConfig;

/// Anything that can hand out a display-ready quote for a locale.
///
/// Implementations must always return a usable string; failures are absorbed
/// rather than surfaced to the caller.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self, locale: Locale) -> String;
}

/// Fetches quotes from a randomly chosen remote provider, falling back to the
/// locale's backup list on any failure.
pub struct HttpQuoteFetcher {
    client: reqwest::Client,
    registry: SourceRegistry,
}

impl HttpQuoteFetcher {
    pub fn new(config: &QuotesConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("quotarium/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            registry: SourceRegistry::with_overrides(&config.endpoints),
        })
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    async fn fetch_from(&self, endpoint: &Endpoint, locale: Locale) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&endpoint.url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        let quote = endpoint.provider.parse(&body)?;
        Ok(quote.display(locale).trim().to_string())
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteFetcher {
    async fn fetch(&self, locale: Locale) -> String {
        let endpoint = {
            let mut rng = rand::thread_rng();
            self.registry.pick(locale, &mut rng).cloned()
        };

        let Some(endpoint) = endpoint else {
            tracing::warn!(%locale, "No quote endpoints configured, serving backup");
            return random_backup(locale, &mut rand::thread_rng());
        };

        match self.fetch_from(&endpoint, locale).await {
            Ok(quote) => {
                tracing::debug!(url = %endpoint.url, "Fetched quote");
                quote
            }
            Err(e) => {
                tracing::warn!(url = %endpoint.url, error = %e, "Quote fetch failed, serving backup");
                random_backup(locale, &mut rand::thread_rng())
            }
        }
    }
}
