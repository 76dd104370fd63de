pub mod cfg;
pub mod constant;
pub mod db;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod mdw;
pub mod portfolio;
pub mod quote;
pub mod req;
pub mod server;
pub mod svc;
pub mod user;
pub mod utils;
