//! The order sync cycle: fetch the book, skip what the ledger has seen,
//! record and announce the rest.
//!
//! Orders are recorded *before* they are announced. A publish failure (or a
//! crash between the two steps) leaves the order marked seen and it is never
//! announced again; the ledger means "handled", not "delivered".

mod scheduler;

pub use scheduler::{Scheduler, DEFAULT_INTERVAL};

use crate::announce::format_announcement;
use crate::ledger::{InsertOutcome, Ledger, LedgerError};
use crate::nostr::Publisher;
use crate::order::{Order, OrderId};
use crate::orderbook::{FetchError, OrderSource};
use std::fmt;
use std::sync::Arc;
use strum::{Display, EnumString};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// What to do when the ledger can't answer for one order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LedgerPolicy {
    /// Stop the cycle and surface the error; the process is expected to exit.
    #[default]
    Abort,
    /// Mark only that order as failed and keep going.
    Isolate,
}

/// Per-order result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Already in the ledger; nothing done.
    AlreadySeen,
    /// Recorded and broadcast.
    Announced { event_id: String, relays_accepted: usize },
    /// Recorded, but the broadcast failed. Not retried.
    AnnounceFailed(String),
    /// Ledger error; the order was not recorded (only under [`LedgerPolicy::Isolate`]).
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReport {
    pub order_id: OrderId,
    pub outcome: OrderOutcome,
}

/// Everything one cycle did, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub orders: Vec<OrderReport>,
}

impl CycleReport {
    /// Ids that were newly recorded this cycle, announced or not.
    pub fn recorded(&self) -> Vec<OrderId> {
        self.orders
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    OrderOutcome::Announced { .. } | OrderOutcome::AnnounceFailed(_)
                )
            })
            .map(|r| r.order_id)
            .collect()
    }

    pub fn announced(&self) -> Vec<OrderId> {
        self.ids_where(|o| matches!(o, OrderOutcome::Announced { .. }))
    }

    pub fn already_seen(&self) -> usize {
        self.ids_where(|o| *o == OrderOutcome::AlreadySeen).len()
    }

    pub fn failed(&self) -> Vec<OrderId> {
        self.ids_where(|o| matches!(o, OrderOutcome::Failed(_) | OrderOutcome::AnnounceFailed(_)))
    }

    fn ids_where(&self, pred: impl Fn(&OrderOutcome) -> bool) -> Vec<OrderId> {
        self.orders
            .iter()
            .filter(|r| pred(&r.outcome))
            .map(|r| r.order_id)
            .collect()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched {}, new {}, announced {}, already seen {}, failed {}",
            self.fetched,
            self.recorded().len(),
            self.announced().len(),
            self.already_seen(),
            self.failed().len(),
        )
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a sync cycle is already running")]
    CycleInProgress,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("ledger failed while processing order {order_id}: {source}")]
    Ledger {
        order_id: OrderId,
        #[source]
        source: LedgerError,
        /// What the cycle managed before it stopped.
        partial: Box<CycleReport>,
    },
}

impl SyncError {
    /// Errors after which the process should not keep scheduling cycles.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Ledger { .. })
    }
}

/// Drives one fetch → dedup → record → announce cycle at a time.
pub struct SyncEngine {
    source: Arc<dyn OrderSource>,
    ledger: Arc<dyn Ledger>,
    publisher: Arc<dyn Publisher>,
    referral_url: String,
    policy: LedgerPolicy,
    /// Held for the whole cycle; overlapping invocations are refused.
    running: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn OrderSource>,
        ledger: Arc<dyn Ledger>,
        publisher: Arc<dyn Publisher>,
        referral_url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            ledger,
            publisher,
            referral_url: referral_url.into(),
            policy: LedgerPolicy::default(),
            running: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: LedgerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Run one full cycle.
    ///
    /// A fetch error ends the cycle before the ledger is touched. Ledger errors
    /// follow the configured [`LedgerPolicy`]. Publish errors are logged and
    /// reported per order.
    pub async fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| SyncError::CycleInProgress)?;

        let orders = self.source.fetch().await.map_err(|e| {
            error!("Order book fetch failed: {e}");
            e
        })?;

        let mut report = CycleReport {
            fetched: orders.len(),
            orders: Vec::with_capacity(orders.len()),
        };

        for order in &orders {
            let outcome = match self.process(order).await {
                Ok(outcome) => outcome,
                Err(source) => match self.policy {
                    LedgerPolicy::Abort => {
                        error!(order_id = order.id, "Ledger error, aborting cycle: {source}");
                        return Err(SyncError::Ledger {
                            order_id: order.id,
                            source,
                            partial: Box::new(report),
                        });
                    }
                    LedgerPolicy::Isolate => {
                        warn!(order_id = order.id, "Ledger error, skipping order: {source}");
                        OrderOutcome::Failed(source.to_string())
                    }
                },
            };

            report.orders.push(OrderReport {
                order_id: order.id,
                outcome,
            });
        }

        info!("Sync cycle complete: {report}");
        Ok(report)
    }

    async fn process(&self, order: &Order) -> Result<OrderOutcome, LedgerError> {
        if self.ledger.has(order.id).await? {
            debug!(order_id = order.id, "Order already seen");
            return Ok(OrderOutcome::AlreadySeen);
        }

        if self.ledger.insert(order.id).await? == InsertOutcome::AlreadyPresent {
            debug!(order_id = order.id, "Order recorded concurrently, skipping");
            return Ok(OrderOutcome::AlreadySeen);
        }
        info!(order_id = order.id, "Order added to database");

        let content = format_announcement(order, &self.referral_url);
        let outcome = match self.publisher.publish(&content).await {
            Ok(receipt) => {
                info!("Sent event {} for order id {}", receipt.event_id, order.id);
                if receipt.accepted == 0 && receipt.failed > 0 {
                    warn!(
                        order_id = order.id,
                        event_id = %receipt.event_id,
                        "No relay accepted the announcement"
                    );
                }
                OrderOutcome::Announced {
                    event_id: receipt.event_id,
                    relays_accepted: receipt.accepted,
                }
            }
            Err(e) => {
                error!(order_id = order.id, "Failed to announce order: {e}");
                OrderOutcome::AnnounceFailed(e.to_string())
            }
        };

        Ok(outcome)
    }
}
