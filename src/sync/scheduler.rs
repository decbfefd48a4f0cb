use super::{SyncEngine, SyncError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Default spacing between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Runs the engine on a fixed interval, one cycle at a time.
///
/// Each cycle is awaited before the next tick is taken, so cycles never overlap;
/// a tick missed because a cycle ran long is delayed, not bunched.
pub struct Scheduler {
    engine: Arc<SyncEngine>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(engine: Arc<SyncEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Run cycles until `shutdown` resolves or a cycle fails fatally.
    ///
    /// The first cycle starts immediately. Shutdown is only observed between
    /// cycles; an in-flight cycle always runs to completion.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), SyncError>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        info!(interval_secs = self.interval.as_secs(), "Scheduler started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, scheduler stopping");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.engine.run_cycle().await {
                        Ok(_) => {}
                        Err(e) if e.is_fatal() => {
                            error!("Fatal sync error, stopping: {e}");
                            return Err(e);
                        }
                        // Next tick retries from scratch.
                        Err(e) => error!("Sync cycle aborted: {e}"),
                    }
                }
            }
        }
    }
}
