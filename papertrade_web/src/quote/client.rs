use reqwest::Client;
use tracing::info;

use super::model::{ProviderQuote, Quote};

#[derive(Clone)]
pub struct QuoteClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl QuoteClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    // Every failure counts as "symbol unavailable"; callers only see Option
    pub async fn lookup(&self, symbol: &str) -> Option<Quote> {
        let url = format!(
            "{}/stock/{}/quote?token={}",
            self.base_url, symbol, self.api_key
        );
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                info!("quote request for {} failed: {}", symbol, e);
                return None;
            }
        };
        if !response.status().is_success() {
            info!("quote provider returned HTTP {} for {}", response.status(), symbol);
            return None;
        }
        match response.json::<ProviderQuote>().await {
            Ok(provider) => provider.into_quote(),
            Err(e) => {
                info!("quote payload for {} unreadable: {}", symbol, e);
                None
            }
        }
    }
}
