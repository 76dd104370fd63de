use sqlx::Postgres;

use super::model::LedgerEntry;

#[derive(Clone)]
pub struct LedgerRepo {
    pub pool: sqlx::Pool<Postgres>,
}

impl LedgerRepo {
    pub fn new(pool: sqlx::Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &LedgerEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO portfolio (stock_buyer, stock_symbol, shares, price, time, unique_stocks)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&entry.stock_buyer)
        .bind(&entry.stock_symbol)
        .bind(entry.shares)
        .bind(entry.price)
        .bind(entry.time)
        .bind(&entry.unique_stocks)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn history_for(&self, buyer: &str) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT stock_buyer, stock_symbol, shares, price, time, unique_stocks
            FROM portfolio
            WHERE stock_buyer = $1
            ORDER BY time DESC"#,
        )
        .bind(buyer)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn held_symbols(&self, buyer: &str) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT stock_symbol, SUM(shares)::BIGINT
            FROM portfolio
            WHERE stock_buyer = $1
            GROUP BY stock_symbol
            HAVING SUM(shares) > 0
            ORDER BY stock_symbol"#,
        )
        .bind(buyer)
        .fetch_all(&self.pool)
        .await
    }

    // The display name travels on the first buy row only
    pub async fn has_entries(&self, buyer: &str, symbol: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM portfolio
                WHERE stock_buyer = $1 AND stock_symbol = $2
            )"#,
        )
        .bind(buyer)
        .bind(symbol)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }
}
