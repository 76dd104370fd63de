use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use papertrade_web::cfg::CONFIG;
use papertrade_web::db;
use papertrade_web::quote::client::QuoteClient;
use papertrade_web::server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = db::connect().await?;
    db::init_schema(&pool).await?;

    let quotes = QuoteClient::new(CONFIG.quote_api_url.clone(), CONFIG.quote_api_key.clone());

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("ctrl-c received");
        let _ = shutdown_tx.send(());
    });

    Server::new(pool, quotes).start(shutdown_rx).await
}
