use config::Config;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub quote_api_url: String,
    pub quote_api_key: String,
    pub starting_cash: Decimal,
}

pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    dotenvy::dotenv().ok();
    Config::builder()
        .set_default("bind_addr", "127.0.0.1:7878")
        .expect("error set default")
        .set_default("session_ttl_hours", 24)
        .expect("error set default")
        .set_default("quote_api_url", "https://cloud.iexapis.com/stable")
        .expect("error set default")
        .set_default("quote_api_key", "")
        .expect("error set default")
        .set_default("starting_cash", "10000.00")
        .expect("error set default")
        .add_source(config::Environment::default())
        .build()
        .expect("error build config")
        .try_deserialize()
        .expect("error deserialize config")
});
