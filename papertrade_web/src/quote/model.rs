use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
}

#[derive(Deserialize, Debug)]
pub struct ProviderQuote {
    pub symbol: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "latestPrice")]
    pub latest_price: f64,
}

impl ProviderQuote {
    // The provider quotes floats; prices are kept as Decimal everywhere else
    pub fn into_quote(self) -> Option<Quote> {
        let price = Decimal::from_f64_retain(self.latest_price)?.round_dp(4);
        if price.is_sign_negative() {
            return None;
        }
        Some(Quote {
            symbol: self.symbol.to_uppercase(),
            name: self.company_name,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_provider_payload() {
        let payload = r#"{"symbol":"nflx","companyName":"Netflix, Inc.","latestPrice":189.75}"#;
        let provider: ProviderQuote = serde_json::from_str(payload).unwrap();
        let quote = provider.into_quote().unwrap();

        assert_eq!(quote.symbol, "NFLX");
        assert_eq!(quote.name, "Netflix, Inc.");
        assert_eq!(quote.price, Decimal::new(18975, 2));
    }

    #[test]
    fn non_finite_price_is_dropped() {
        let provider = ProviderQuote {
            symbol: "NFLX".to_string(),
            company_name: "Netflix, Inc.".to_string(),
            latest_price: f64::NAN,
        };
        assert!(provider.into_quote().is_none());
    }
}
