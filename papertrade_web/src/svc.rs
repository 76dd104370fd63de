use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::info;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use session_auth::jwt::issue_jwt;

use crate::{
    cfg::CONFIG,
    constant::{BAD_REQUEST, FORBIDDEN, OK_RESPONSE},
    error::TradeError,
    ledger::{
        model::{HistoryRow, LedgerEntry},
        repo::LedgerRepo,
    },
    mdw::SessionUser,
    portfolio::model::{PortfolioPosition, PortfolioSummary},
    quote::client::QuoteClient,
    req::Request,
    user::repo::UserRepo,
    utils::{self, ser_to_str},
};

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct Response<T> {
    pub status: String,
    pub message: T,
}

#[derive(Clone)]
pub struct Service {
    user_repo: UserRepo,
    ledger_repo: LedgerRepo,
    quotes: QuoteClient,
}

impl Service {
    pub fn new(user_repo: UserRepo, ledger_repo: LedgerRepo, quotes: QuoteClient) -> Self {
        Self {
            user_repo,
            ledger_repo,
            quotes,
        }
    }

    pub async fn index<W: AsyncWrite + Unpin>(
        &self,
        session: &SessionUser,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let held = self.ledger_repo.held_symbols(&session.username).await?;
        let mut stocks = Vec::new();
        for (symbol, shares) in held {
            match self.quotes.lookup(&symbol).await {
                Some(quote) => {
                    stocks.push(PortfolioPosition::new(symbol, quote.name, shares, quote.price));
                }
                // A held symbol with no quote is left out of the summary
                None => info!("no quote for held symbol {}, omitting", symbol),
            }
        }
        let user = match self.user_repo.get_by_username(&session.username).await {
            Ok(user) => user,
            Err(sqlx::Error::RowNotFound) => {
                return apology(writer, BAD_REQUEST, "user not found").await;
            }
            Err(e) => return Err(e.into()),
        };
        write_json(writer, PortfolioSummary::new(stocks, user.cash)).await
    }

    pub async fn buy<W: AsyncWrite + Unpin>(
        &self,
        request: &Request,
        session: &SessionUser,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let form = request.form_fields();
        let symbol = form
            .get("symbol")
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_default();
        if symbol.is_empty() {
            return apology(writer, BAD_REQUEST, "must provide stock name").await;
        }
        let shares = match form.get("shares").and_then(|s| utils::parse_positive_int(s)) {
            Some(shares) => shares,
            None => {
                return apology(
                    writer,
                    BAD_REQUEST,
                    "must provide positive whole number of shares",
                )
                .await;
            }
        };
        let quote = match self.quotes.lookup(&symbol).await {
            Some(quote) => quote,
            None => return apology(writer, BAD_REQUEST, "invalid stock symbol").await,
        };
        let user = self.user_repo.get_by_username(&session.username).await?;
        // A cost that overflows Decimal can never be covered
        let cost = match order_cost(quote.price, shares) {
            Some(cost) if !exceeds_cash(cost, user.cash) => cost,
            _ => return apology(writer, FORBIDDEN, "not enough money for the stock").await,
        };
        let first_buy = !self
            .ledger_repo
            .has_entries(&session.username, &symbol)
            .await?;
        let entry = LedgerEntry::buy(
            &session.username,
            &symbol,
            shares,
            cost,
            first_buy.then(|| quote.name.clone()),
        );
        self.user_repo
            .update_cash(&session.username, user.cash - entry.price)
            .await?;
        self.ledger_repo.insert(&entry).await?;
        info!("{} bought {} {}", session.username, shares, symbol);
        redirect(writer, "/", None).await
    }

    pub async fn sell<W: AsyncWrite + Unpin>(
        &self,
        request: &Request,
        session: &SessionUser,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let form = request.form_fields();
        let symbol = form
            .get("symbol")
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_default();
        if symbol.is_empty() {
            return apology(writer, BAD_REQUEST, "must provide stock name").await;
        }
        let held = self.ledger_repo.held_symbols(&session.username).await?;
        let holding = match held.iter().find(|(held_symbol, _)| *held_symbol == symbol) {
            Some((_, shares)) => *shares,
            None => return apology(writer, BAD_REQUEST, "you do not hold this stock").await,
        };
        let shares = match form.get("shares").and_then(|s| utils::parse_positive_int(s)) {
            Some(shares) => shares,
            None => {
                return apology(
                    writer,
                    BAD_REQUEST,
                    "must provide positive whole number of shares",
                )
                .await;
            }
        };
        if exceeds_holding(shares, holding) {
            return apology(writer, BAD_REQUEST, "not enough shares").await;
        }
        let quote = match self.quotes.lookup(&symbol).await {
            Some(quote) => quote,
            None => return apology(writer, BAD_REQUEST, "lookup failed for stock").await,
        };
        let user = self.user_repo.get_by_username(&session.username).await?;
        // Proceeds the balance cannot absorb get the failed-lookup apology
        let proceeds = match order_cost(quote.price, shares) {
            Some(proceeds) if user.cash.checked_add(proceeds).is_some() => proceeds,
            _ => return apology(writer, BAD_REQUEST, "lookup failed for stock").await,
        };
        let entry = LedgerEntry::sell(&session.username, &symbol, shares, proceeds);
        // entry.price is negative here, so the usual debit credits the sale
        self.user_repo
            .update_cash(&session.username, user.cash - entry.price)
            .await?;
        self.ledger_repo.insert(&entry).await?;
        info!("{} sold {} {}", session.username, shares, symbol);
        redirect(writer, "/", None).await
    }

    pub async fn sell_options<W: AsyncWrite + Unpin>(
        &self,
        session: &SessionUser,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let held = self.ledger_repo.held_symbols(&session.username).await?;
        let symbols: Vec<String> = held.into_iter().map(|(symbol, _)| symbol).collect();
        write_json(writer, symbols).await
    }

    pub async fn quote<W: AsyncWrite + Unpin>(
        &self,
        request: &Request,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let mut form = request.form_fields();
        let symbol = request
            .params
            .as_ref()
            .and_then(|params| params.get("symbol").cloned())
            .or_else(|| form.remove("symbol"))
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_default();
        if symbol.is_empty() {
            return apology(writer, BAD_REQUEST, "no such stock").await;
        }
        match self.quotes.lookup(&symbol).await {
            Some(quote) => write_json(writer, quote).await,
            None => apology(writer, BAD_REQUEST, "no such stock").await,
        }
    }

    pub async fn history<W: AsyncWrite + Unpin>(
        &self,
        session: &SessionUser,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let entries = self.ledger_repo.history_for(&session.username).await?;
        let rows: Vec<HistoryRow> = entries.iter().map(HistoryRow::from_entry).collect();
        write_json(writer, rows).await
    }

    pub async fn withdraw<W: AsyncWrite + Unpin>(
        &self,
        request: &Request,
        session: &SessionUser,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let form = request.form_fields();
        let amount = match form.get("amount").and_then(|s| utils::parse_positive_int(s)) {
            Some(amount) => Decimal::from(amount),
            None => {
                return apology(
                    writer,
                    FORBIDDEN,
                    "must provide a positive whole number amount",
                )
                .await;
            }
        };
        let user = self.user_repo.get_by_username(&session.username).await?;
        if exceeds_cash(amount, user.cash) {
            return apology(writer, FORBIDDEN, "not enough money to withdraw").await;
        }
        self.user_repo
            .update_cash(&session.username, user.cash - amount)
            .await?;
        info!("{} withdrew {}", session.username, amount);
        redirect(writer, "/", None).await
    }

    pub async fn login<W: AsyncWrite + Unpin>(
        &self,
        request: &Request,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let form = request.form_fields();
        let username = form.get("username").map(String::as_str).unwrap_or_default();
        if username.is_empty() {
            return apology(writer, FORBIDDEN, "must provide username").await;
        }
        let password = form.get("password").map(String::as_str).unwrap_or_default();
        if password.is_empty() {
            return apology(writer, FORBIDDEN, "must provide password").await;
        }
        let user = match self.user_repo.get_by_username(username).await {
            Ok(user) => user,
            Err(sqlx::Error::RowNotFound) => {
                return apology(writer, FORBIDDEN, "invalid username and/or password").await;
            }
            Err(e) => return Err(e.into()),
        };
        if !verify_password(password, &user.hash) {
            return apology(writer, FORBIDDEN, "invalid username and/or password").await;
        }
        let token = issue_jwt(
            user.id,
            &user.username,
            &CONFIG.session_secret,
            CONFIG.session_ttl_hours,
        )?;
        info!("{} logged in", user.username);
        redirect(writer, "/", Some(&utils::session_cookie(&token))).await
    }

    pub async fn register<W: AsyncWrite + Unpin>(
        &self,
        request: &Request,
        writer: &mut W,
    ) -> Result<(), TradeError> {
        let form = request.form_fields();
        let username = form.get("username").map(String::as_str).unwrap_or_default();
        if username.is_empty() {
            return apology(writer, BAD_REQUEST, "must provide username").await;
        }
        let password = form.get("password").map(String::as_str).unwrap_or_default();
        if password.is_empty() {
            return apology(writer, BAD_REQUEST, "must provide password").await;
        }
        if form.get("confirmation").map(String::as_str) != Some(password) {
            return apology(writer, BAD_REQUEST, "password and confirmation don't match").await;
        }
        match self.user_repo.get_by_username(username).await {
            Ok(_) => return apology(writer, BAD_REQUEST, "the username is already taken").await,
            Err(sqlx::Error::RowNotFound) => {}
            Err(e) => return Err(e.into()),
        }
        let hash = hash_password(password)?;
        let user_id = self
            .user_repo
            .insert(username, &hash, CONFIG.starting_cash)
            .await?;
        let token = issue_jwt(
            user_id,
            username,
            &CONFIG.session_secret,
            CONFIG.session_ttl_hours,
        )?;
        info!("registered {}", username);
        redirect(writer, "/", Some(&utils::session_cookie(&token))).await
    }

    pub async fn logout<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<(), TradeError> {
        redirect(writer, "/", Some(utils::clear_session_cookie())).await
    }
}

pub fn hash_password(password: &str) -> Result<String, TradeError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TradeError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// Gates for the mutating handlers. Spending the whole balance or
// emptying a position is allowed; one step past either is rejected
// before anything is written.
fn order_cost(unit_price: Decimal, shares: i64) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(shares))
}

fn exceeds_cash(amount: Decimal, cash: Decimal) -> bool {
    amount > cash
}

fn exceeds_holding(shares: i64, held: i64) -> bool {
    shares > held
}

async fn write_json<W, T>(writer: &mut W, payload: T) -> Result<(), TradeError>
where
    W: AsyncWrite + Unpin,
    T: for<'a> Deserialize<'a> + Serialize,
{
    let response = Response {
        status: String::from("ok"),
        message: payload,
    };
    let response_json = ser_to_str(&response)?;
    writer
        .write_all(format!("{}{}", OK_RESPONSE, response_json).as_bytes())
        .await?;
    Ok(())
}

// A validation failure: apology body, 400 or 403, nothing mutated
async fn apology<W: AsyncWrite + Unpin>(
    writer: &mut W,
    status_line: &str,
    message: &str,
) -> Result<(), TradeError> {
    let response = Response {
        status: String::from("error"),
        message: message.to_string(),
    };
    let response_json = ser_to_str(&response)?;
    writer
        .write_all(format!("{}{}", status_line, response_json).as_bytes())
        .await?;
    Ok(())
}

async fn redirect<W: AsyncWrite + Unpin>(
    writer: &mut W,
    location: &str,
    set_cookie: Option<&str>,
) -> Result<(), TradeError> {
    writer
        .write_all(utils::redirect_response(location, set_cookie).as_bytes())
        .await?;
    Ok(())
}
