use std::{error::Error, fmt::Debug};

#[derive(thiserror::Error)]
pub enum TradeError {
    #[error("Serde error")]
    Serde(#[from] serde_json::Error),

    #[error("Query error")]
    Database(#[from] sqlx::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Session token error")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hash error: {0}")]
    Hash(String),
}

impl Debug for TradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        if let Some(source) = self.source() {
            write!(f, " (Caused by: {})", source)?;
        }
        Ok(())
    }
}
