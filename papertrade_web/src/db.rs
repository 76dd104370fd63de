use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::cfg::CONFIG;

pub async fn connect() -> Result<Pool<Postgres>, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&CONFIG.database_url)
        .await
}

pub async fn init_schema(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            hash TEXT NOT NULL,
            cash NUMERIC(15, 2) NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio (
            stock_buyer TEXT NOT NULL,
            stock_symbol TEXT NOT NULL,
            shares BIGINT NOT NULL,
            price NUMERIC(15, 2) NOT NULL,
            time TIMESTAMPTZ NOT NULL,
            unique_stocks TEXT
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_portfolio_buyer_symbol
        ON portfolio (stock_buyer, stock_symbol)"#,
    )
    .execute(pool)
    .await?;

    info!("database schema ready");
    Ok(())
}
