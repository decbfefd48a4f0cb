use crate::args::Args;
use crate::config::BridgeConfig;
use crate::ledger::{Ledger, MemoryLedger, MySqlLedger};
use crate::nostr::{LogPublisher, Publisher, RelayPool};
use crate::orderbook::RobosatsClient;
use crate::sync::{Scheduler, SyncEngine};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

pub struct Application {
    config: BridgeConfig,
}

impl Application {
    pub fn init(args: &Args) -> Result<Application> {
        let config = BridgeConfig::setup(args).context("Invalid configuration")?;
        Ok(Application { config })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run until interrupted, or a single cycle with `--once`.
    ///
    /// Returns an error when the configured ledger policy stops the bridge, so
    /// the process exits non-zero and a supervisor can restart it.
    pub async fn run(&self) -> Result<()> {
        let (engine, mysql) = self.build_engine().await?;
        let engine = Arc::new(engine);

        let result = if self.config.run_once {
            engine
                .run_cycle()
                .await
                .map(|report| info!("Single cycle finished: {report}"))
                .context("Sync cycle failed")
        } else {
            Scheduler::new(engine, self.config.interval)
                .run_until(shutdown_signal())
                .await
                .context("Sync stopped")
        };

        if let Some(ledger) = mysql {
            ledger.close().await;
        }

        result
    }

    async fn build_engine(&self) -> Result<(SyncEngine, Option<MySqlLedger>)> {
        let config = &self.config;

        let source = RobosatsClient::new(
            &config.source.base_url,
            config.source.proxy_url.as_deref(),
            config.source.timeout,
        )
        .context("Failed to build the order book client")?;

        let (ledger, mysql): (Arc<dyn Ledger>, Option<MySqlLedger>) = match &config.ledger {
            Some(ledger_config) => {
                let ledger = MySqlLedger::connect(ledger_config)
                    .await
                    .context("Failed to connect to the ledger database")?;
                (Arc::new(ledger.clone()), Some(ledger))
            }
            None => (Arc::new(MemoryLedger::new()), None),
        };

        let keys = config.nostr.keys.clone();
        let publisher: Arc<dyn Publisher> = if config.dry_run {
            Arc::new(LogPublisher::new(keys))
        } else {
            Arc::new(RelayPool::new(
                keys,
                config.nostr.relays.iter().cloned(),
                config.nostr.relay_timeout,
            ))
        };

        let engine = SyncEngine::new(
            Arc::new(source),
            ledger,
            publisher,
            config.referral_url.clone(),
        )
        .with_policy(config.ledger_policy);

        Ok((engine, mysql))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C, running until killed: {e}");
        std::future::pending::<()>().await;
    }
}
