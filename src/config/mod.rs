use crate::args::Args;
use crate::config::load_http_url::load_http_url;
use crate::config::load_keys::load_keys;
use crate::config::load_proxy_url::load_proxy_url;
use crate::config::load_relays::load_relays;
use crate::config::load_required::load_required;
use crate::ledger::MySqlLedgerConfig;
use crate::nostr::Keys;
use crate::sync::{LedgerPolicy, DEFAULT_INTERVAL};
use crate::{nostr::DEFAULT_RELAY_TIMEOUT, orderbook::DEFAULT_FETCH_TIMEOUT};
use anyhow::{Context, Result};
use derive_builder::Builder;
use std::time::Duration;
use tracing::info;

mod load_http_url;
mod load_keys;
mod load_proxy_url;
mod load_relays;
mod load_required;

/// Where and how the order book is fetched.
#[derive(Builder, Clone, Debug)]
pub struct SourceConfig {
    /// Coordinator base URL, usually an onion address
    #[builder(setter(into))]
    pub(crate) base_url: String,
    /// Full proxy URL including the port; `None` connects directly
    #[builder(setter(into, strip_option), default)]
    pub(crate) proxy_url: Option<String>,
    #[builder(default = "DEFAULT_FETCH_TIMEOUT")]
    pub(crate) timeout: Duration,
}

impl SourceConfig {
    pub fn builder() -> SourceConfigBuilder {
        SourceConfigBuilder::default()
    }
}

#[derive(Builder, Clone, Debug)]
pub struct NostrConfig {
    pub(crate) keys: Keys,
    pub(crate) relays: Vec<String>,
    #[builder(default = "DEFAULT_RELAY_TIMEOUT")]
    pub(crate) relay_timeout: Duration,
}

impl NostrConfig {
    pub fn builder() -> NostrConfigBuilder {
        NostrConfigBuilder::default()
    }
}

#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct BridgeConfig {
    pub(crate) source: SourceConfig,
    pub(crate) nostr: NostrConfig,
    /// `None` in dry-run mode, where an in-memory ledger is used
    #[builder(setter(strip_option), default)]
    pub(crate) ledger: Option<MySqlLedgerConfig>,
    /// Link embedded in every announcement
    #[builder(setter(into))]
    pub(crate) referral_url: String,
    #[builder(default = "DEFAULT_INTERVAL")]
    pub(crate) interval: Duration,
    #[builder(default)]
    pub(crate) ledger_policy: LedgerPolicy,
    #[builder(default)]
    pub(crate) run_once: bool,
    #[builder(default)]
    pub(crate) dry_run: bool,
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates every setting in `args`. Any missing or malformed value is an error.
    pub fn setup(args: &Args) -> Result<BridgeConfig> {
        let proxy_url = load_proxy_url(args.tor_proxy_url.as_deref(), args.tor_proxy_port.as_deref())
            .context("Failed to load Tor proxy")?;
        let base_url = load_http_url("ROBOSATS_ONION_URL", args.robosats_onion_url.as_deref())
            .context("Failed to load RoboSats URL")?;
        let referral_url =
            load_http_url("ROBOSATS_REFERRAL_URL", args.robosats_referral_url.as_deref())
                .context("Failed to load referral URL")?;
        let keys = load_keys(args.nostr_privkey.as_deref()).context("Failed to load Nostr key")?;
        let relays = load_relays(args.nostr_relays.as_deref()).context("Failed to load relays")?;

        let source = SourceConfig::builder()
            .base_url(base_url)
            .proxy_url(proxy_url)
            .timeout(Duration::from_secs(args.fetch_timeout_secs))
            .build()
            .context("Failed to build order book config")?;

        let nostr = NostrConfig::builder()
            .keys(keys)
            .relays(relays)
            .relay_timeout(Duration::from_secs(args.relay_timeout_secs))
            .build()
            .context("Failed to build Nostr config")?;

        let mut builder = Self::builder()
            .source(source)
            .nostr(nostr)
            .referral_url(referral_url)
            .interval(Duration::from_secs(args.interval_secs))
            .ledger_policy(args.ledger_policy)
            .run_once(args.once)
            .dry_run(args.dry_run);

        // A dry run never touches the database, so its settings are optional there.
        if !args.dry_run {
            builder = builder.ledger(Self::load_ledger(args).context("Failed to load ledger")?);
        }

        let config = builder.build().context("Failed to build configuration")?;
        config.print_config_summary();

        Ok(config)
    }

    fn load_ledger(args: &Args) -> Result<MySqlLedgerConfig> {
        Ok(MySqlLedgerConfig::new(
            load_required("DB_URL", args.db_url.as_deref())?,
            load_required("DB_TABLE", args.db_table.as_deref())?,
            load_required("DB_USERNAME", args.db_username.as_deref())?,
            load_required("DB_PASSWORD", args.db_password.as_deref())?,
        ))
    }

    /// Logs the effective settings. Secrets are never printed.
    fn print_config_summary(&self) {
        info!("Using nostr pubkey {}", self.nostr.keys.public_key_hex());
        info!("Order book: {}", self.source.base_url);
        info!(
            "Tor proxy: {}",
            self.source.proxy_url.as_deref().unwrap_or("none (direct)")
        );
        info!("Relays: {}", self.nostr.relays.join(", "));
        info!("Referral link: {}", self.referral_url);
        match &self.ledger {
            Some(ledger) => info!("Ledger: mysql {}", ledger.display_target()),
            None => info!("Ledger: in-memory (dry run)"),
        }
        info!(
            "Interval: {}s, ledger policy: {}{}",
            self.interval.as_secs(),
            self.ledger_policy,
            if self.run_once { ", single cycle" } else { "" }
        );
    }
}
