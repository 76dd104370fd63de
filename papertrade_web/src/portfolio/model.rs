use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct PortfolioPosition {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    pub price: Decimal,
    pub total: Decimal,
}

impl PortfolioPosition {
    pub fn new(symbol: String, name: String, shares: i64, price: Decimal) -> Self {
        // A value past Decimal range pins to MAX
        let total = price
            .checked_mul(Decimal::from(shares))
            .unwrap_or(Decimal::MAX);
        Self {
            symbol,
            name,
            shares,
            price,
            total,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PortfolioSummary {
    pub stocks: Vec<PortfolioPosition>,
    pub cash: Decimal,
    pub total: Decimal,
}

impl PortfolioSummary {
    pub fn new(stocks: Vec<PortfolioPosition>, cash: Decimal) -> Self {
        // Grand total is every position value plus uninvested cash
        let invested = stocks.iter().fold(Decimal::ZERO, |acc, s| {
            acc.checked_add(s.total).unwrap_or(Decimal::MAX)
        });
        Self {
            stocks,
            cash,
            total: invested.checked_add(cash).unwrap_or(Decimal::MAX),
        }
    }
}
