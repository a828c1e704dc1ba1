//! Alpha Vantage quote source.

use async_trait::async_trait;
use dayroll_types::{QuoteBatch, QuoteSource, SourceError, Symbol};
use tracing::debug;

use crate::url::{DEFAULT_ENDPOINT, intraday_url};
use crate::{DownloadClient, DownloadError, parse_intraday};

/// Connection details for the Alpha Vantage API.
#[derive(Clone)]
pub struct AlphaVantageConfig {
    /// Query endpoint.
    pub endpoint: String,
    /// API key. Never logged.
    pub api_key: String,
}

impl AlphaVantageConfig {
    /// Creates a configuration for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl std::fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// [`QuoteSource`] that downloads hourly intraday bars from Alpha Vantage.
#[derive(Debug, Clone)]
pub struct AlphaVantageSource {
    client: DownloadClient,
    config: AlphaVantageConfig,
}

impl AlphaVantageSource {
    /// Creates a source from a download client and API configuration.
    #[must_use]
    pub const fn new(client: DownloadClient, config: AlphaVantageConfig) -> Self {
        Self { client, config }
    }

    /// Returns the API configuration.
    #[must_use]
    pub const fn config(&self) -> &AlphaVantageConfig {
        &self.config
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageSource {
    async fn fetch(&self, symbol: &Symbol) -> Result<QuoteBatch, SourceError> {
        let url = intraday_url(&self.config.endpoint, symbol, &self.config.api_key);
        debug!(%symbol, endpoint = %self.config.endpoint, "fetching intraday quotes");

        let body = self.client.download(&url).await.map_err(|e| match e {
            DownloadError::ServerError { status } => SourceError::Status { status },
            // reqwest errors embed the URL, which carries the key.
            DownloadError::Http(e) => SourceError::Http(e.without_url().to_string()),
        })?;

        let batch = parse_intraday(symbol, &body)?;
        debug!(%symbol, quotes = batch.len(), malformed = batch.malformed.len(), "parsed intraday quotes");
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_redacts_key() {
        let config = AlphaVantageConfig::new("SECRET123");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("SECRET123"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains(DEFAULT_ENDPOINT));
    }

    #[test]
    fn test_config_with_endpoint() {
        let config = AlphaVantageConfig::new("k").with_endpoint("http://localhost:9000/query");
        assert_eq!(config.endpoint, "http://localhost:9000/query");
        assert_eq!(config.api_key, "k");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let client = DownloadClient::new(crate::ClientConfig {
            max_retries: 0,
            ..Default::default()
        })
        .unwrap();
        let source = AlphaVantageSource::new(
            client,
            AlphaVantageConfig::new("SECRET123").with_endpoint("http://127.0.0.1:1/query"),
        );

        let err = source.fetch(&Symbol::new("IBM").unwrap()).await.unwrap_err();
        let SourceError::Http(message) = err else {
            panic!("expected transport error, got {err:?}");
        };
        assert!(!message.contains("SECRET123"));
    }
}
