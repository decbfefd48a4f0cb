//! Bridges the RoboSats public order book to Nostr.
//!
//! Every cycle fetches the book over Tor, records unseen orders in the ledger
//! and posts one text note per new order to the configured relays.

pub mod announce;
pub mod app;
pub mod args;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod nostr;
pub mod order;
pub mod orderbook;
pub mod sync;
mod utils;

pub use app::Application;
pub use args::Args;
pub use config::BridgeConfig;
pub use sync::{CycleReport, LedgerPolicy, OrderOutcome, Scheduler, SyncEngine, SyncError};
