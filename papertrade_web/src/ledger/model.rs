use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trade. Holdings are never stored directly; they are the sum of
/// `shares` over a user's rows, so a sell is just a row with negative
/// shares and a negative total price.
#[derive(Serialize, Deserialize, sqlx::FromRow, Debug)]
pub struct LedgerEntry {
    pub stock_buyer: String,
    pub stock_symbol: String,
    pub shares: i64,
    pub price: Decimal,
    pub time: DateTime<Utc>,
    pub unique_stocks: Option<String>,
}

impl LedgerEntry {
    /// `cost` is the already-priced total for the whole order.
    pub fn buy(
        buyer: &str,
        symbol: &str,
        shares: i64,
        cost: Decimal,
        first_buy_name: Option<String>,
    ) -> Self {
        Self {
            stock_buyer: buyer.to_string(),
            stock_symbol: symbol.to_string(),
            shares,
            price: cost,
            time: Utc::now(),
            unique_stocks: first_buy_name,
        }
    }

    pub fn sell(buyer: &str, symbol: &str, shares: i64, proceeds: Decimal) -> Self {
        Self {
            stock_buyer: buyer.to_string(),
            stock_symbol: symbol.to_string(),
            shares: -shares,
            // Negative total, so subtracting it from cash credits the sale
            price: -proceeds,
            time: Utc::now(),
            unique_stocks: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryRow {
    pub symbol: String,
    #[serde(rename = "type")]
    pub txn_type: String,
    pub shares: i64,
    pub price: Decimal,
    pub time: DateTime<Utc>,
}

impl HistoryRow {
    pub fn from_entry(entry: &LedgerEntry) -> Self {
        let txn_type = if entry.shares > 0 { "BUY" } else { "SELL" };
        Self {
            symbol: entry.stock_symbol.clone(),
            txn_type: txn_type.to_string(),
            shares: entry.shares.abs(),
            price: entry.price.abs(),
            time: entry.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn buy_entries_carry_positive_shares_and_total() {
        let entry =
            LedgerEntry::buy("alice", "AAPL", 4, usd(100000), Some("Apple Inc".to_string()));
        assert_eq!(entry.shares, 4);
        assert_eq!(entry.price, usd(100000));
        assert_eq!(entry.unique_stocks, Some("Apple Inc".to_string()));
    }

    #[test]
    fn sell_entries_negate_shares_and_total() {
        let entry = LedgerEntry::sell("alice", "AAPL", 4, usd(100000));
        assert_eq!(entry.shares, -4);
        assert_eq!(entry.price, usd(-100000));
        assert_eq!(entry.unique_stocks, None);
    }

    #[test]
    fn cash_mutation_is_uniform_across_sides() {
        let cash = usd(1000000);
        let bought = LedgerEntry::buy("alice", "AAPL", 4, usd(100000), None);
        let after_buy = cash - bought.price;
        assert_eq!(after_buy, usd(900000));

        let sold = LedgerEntry::sell("alice", "AAPL", 4, usd(100000));
        let after_sell = after_buy - sold.price;
        assert_eq!(after_sell, cash);
    }

    #[test]
    fn history_type_follows_share_sign() {
        let bought = LedgerEntry::buy("alice", "AAPL", 4, usd(100000), None);
        let row = HistoryRow::from_entry(&bought);
        assert_eq!(row.txn_type, "BUY");
        assert_eq!(row.shares, 4);
        assert_eq!(row.price, usd(100000));

        let sold = LedgerEntry::sell("alice", "AAPL", 1, usd(25000));
        let row = HistoryRow::from_entry(&sold);
        assert_eq!(row.txn_type, "SELL");
        assert_eq!(row.shares, 1);
        assert_eq!(row.price, usd(25000));
    }
}
