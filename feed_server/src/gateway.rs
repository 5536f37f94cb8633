//! HTTP gateway to the fundamentals API.
//!
//! Fetches the peers list of one symbol as a raw string. The body is handed to the
//! subject untouched; observers decode it.
use feed_common::{Category, QuoteError, Result};
use log::debug;
use reqwest::blocking::Client;
use std::time::Duration;

/// Default base URL of the fundamentals API.
pub const DEFAULT_API_BASE: &str = "https://api.profit.com/data-api/fundamentals";
/// Connect and read timeout for one request, in milliseconds.
const TIMEOUT_MS: u64 = 5000;

/// Source of raw payloads for a category.
pub trait QuoteSource: Send + Sync {
    /// Fetch the raw payload for `symbol` in `category`.
    fn fetch(&self, category: Category, symbol: &str) -> Result<String>;
}

/// Blocking client for the fundamentals API.
pub struct ProfitGateway {
    client: Client,
    base_url: String,
    token: String,
}

impl ProfitGateway {
    /// Create a gateway for `base_url` authenticating with `token`.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(TIMEOUT_MS))
            .timeout(Duration::from_millis(TIMEOUT_MS))
            .build()
            .map_err(|e| QuoteError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Peers URL without the token, safe to log.
    pub fn peers_url(&self, category: Category, symbol: &str) -> String {
        format!("{}/{}/peers/{}", self.base_url, category.endpoint(), symbol)
    }
}

impl QuoteSource for ProfitGateway {
    fn fetch(&self, category: Category, symbol: &str) -> Result<String> {
        let url = self.peers_url(category, symbol);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .map_err(|e| QuoteError::Transport(format!("{}: {}", url, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Transport(format!("{} answered {}", url, status)));
        }

        let body = response
            .text()
            .map_err(|e| QuoteError::Transport(format!("{}: {}", url, e.without_url())))?;
        if body.trim().is_empty() {
            return Err(QuoteError::Transport(format!("{} returned an empty body", url)));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_peers_url_per_category() {
        let gateway = ProfitGateway::new("https://example.test/api/", "secret").unwrap();
        assert_eq!(
            gateway.peers_url(Category::Equity, "TSLA"),
            "https://example.test/api/stocks/peers/TSLA"
        );
        assert_eq!(
            gateway.peers_url(Category::Commodity, "LCO"),
            "https://example.test/api/commodities/peers/LCO"
        );
        assert!(!gateway.peers_url(Category::Forex, "EURUSD").contains("secret"));
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let gateway = ProfitGateway::new("http://127.0.0.1:9", "secret").unwrap();
        let err = gateway.fetch(Category::Forex, "EURUSD").unwrap_err();
        assert!(matches!(err, QuoteError::Transport(ref msg) if !msg.contains("secret")));
    }
}
