//! Alpha Vantage URL construction.

use dayroll_types::Symbol;

/// Default Alpha Vantage query endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.alphavantage.co/query";

/// Sampling interval requested from the vendor.
///
/// Daily reduction keys on the hour of day, so only hourly bars are used.
pub const INTERVAL: &str = "60min";

/// Builds the URL for a symbol's full hourly intraday series.
///
/// # Example
///
/// ```
/// use dayroll_fetch::url::{DEFAULT_ENDPOINT, intraday_url};
/// use dayroll_types::Symbol;
///
/// let symbol = Symbol::new("ibm").unwrap();
/// let url = intraday_url(DEFAULT_ENDPOINT, &symbol, "demo");
/// assert_eq!(
///     url,
///     "https://www.alphavantage.co/query?function=TIME_SERIES_INTRADAY&symbol=IBM&interval=60min&outputsize=full&apikey=demo"
/// );
/// ```
#[must_use]
pub fn intraday_url(endpoint: &str, symbol: &Symbol, api_key: &str) -> String {
    format!(
        "{}?function=TIME_SERIES_INTRADAY&symbol={}&interval={}&outputsize=full&apikey={}",
        endpoint.trim_end_matches('?'),
        symbol,
        INTERVAL,
        api_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intraday_url_uppercases_symbol() {
        let symbol = Symbol::new("aapl").unwrap();
        let url = intraday_url(DEFAULT_ENDPOINT, &symbol, "KEY");
        assert!(url.contains("symbol=AAPL"));
        assert!(url.ends_with("apikey=KEY"));
    }

    #[test]
    fn test_intraday_url_custom_endpoint() {
        let symbol = Symbol::new("IBM").unwrap();
        let url = intraday_url("http://127.0.0.1:8080/query", &symbol, "k");
        assert!(url.starts_with("http://127.0.0.1:8080/query?function=TIME_SERIES_INTRADAY"));
        assert!(url.contains("interval=60min"));
    }
}
