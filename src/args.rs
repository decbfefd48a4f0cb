use crate::sync::LedgerPolicy;
use clap::{Parser, ValueHint};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LEDGER_POLICY: &str = "abort"; // parsed by parser

/// Announce new RoboSats orders on Nostr.
///
/// Every setting can also come from the environment or from `.env`
/// (or the file named by `APP_ENV_FILE`).
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Tor proxy scheme and host, e.g. socks5h://127.0.0.1
    #[arg(long, env = "TOR_PROXY_URL")]
    pub tor_proxy_url: Option<String>,

    /// Tor proxy port
    #[arg(long, env = "TOR_PROXY_PORT")]
    pub tor_proxy_port: Option<String>,

    /// Hex-encoded Nostr secret key
    #[arg(long, env = "NOSTR_PRIVKEY", hide_env_values = true)]
    pub nostr_privkey: Option<String>,

    /// Comma-separated relay URLs (ws:// or wss://)
    #[arg(long, env = "NOSTR_RELAYS")]
    pub nostr_relays: Option<String>,

    /// RoboSats coordinator onion URL the order book is fetched from
    #[arg(long, env = "ROBOSATS_ONION_URL", value_hint = ValueHint::Url)]
    pub robosats_onion_url: Option<String>,

    /// Link embedded in every announcement
    #[arg(long, env = "ROBOSATS_REFERRAL_URL", value_hint = ValueHint::Url)]
    pub robosats_referral_url: Option<String>,

    /// Ledger database address, host or host:port
    #[arg(long, env = "DB_URL")]
    pub db_url: Option<String>,

    /// Ledger database name
    #[arg(long, env = "DB_TABLE")]
    pub db_table: Option<String>,

    #[arg(long, env = "DB_USERNAME")]
    pub db_username: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Seconds between sync cycles
    #[arg(
        long,
        env = "SYNC_INTERVAL_SECS",
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Bound on one order book fetch, in seconds
    #[arg(
        long,
        env = "FETCH_TIMEOUT_SECS",
        default_value_t = DEFAULT_FETCH_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout_secs: u64,

    /// Bound on one relay exchange, in seconds
    #[arg(
        long,
        env = "RELAY_TIMEOUT_SECS",
        default_value_t = DEFAULT_RELAY_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub relay_timeout_secs: u64,

    /// What a ledger failure does (abort | isolate).
    /// abort: stop the cycle and exit non-zero.
    /// isolate: fail only the affected order and keep going.
    #[arg(
        long,
        env = "LEDGER_POLICY",
        value_parser = parse_ledger_policy,
        default_value = DEFAULT_LEDGER_POLICY
    )]
    pub ledger_policy: LedgerPolicy,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, env = "LOG_DIR", value_hint = ValueHint::DirPath)]
    pub log_dir: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Use an in-memory ledger and log announcements instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn parse_ledger_policy(s: &str) -> Result<LedgerPolicy, String> {
    LedgerPolicy::from_str(s.trim()).map_err(|_| {
        format!(
            "invalid LEDGER_POLICY '{}'; expected one of: abort, isolate",
            s
        )
    })
}
