//! In-process stand-ins for the order book, the ledger and the relays.
#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use robosats_nostr::ledger::{InsertOutcome, Ledger, LedgerError, MemoryLedger};
use robosats_nostr::nostr::{PublishError, PublishReceipt, Publisher};
use robosats_nostr::order::{Order, OrderId};
use robosats_nostr::orderbook::{FetchError, OrderSource};
use serde_json::json;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const REFERRAL: &str = "https://robosats.com/ref/abc";

pub fn order(id: OrderId) -> Order {
    serde_json::from_value(json!({
        "id": id,
        "type": id % 2,
        "currency": 2,
        "amount": "150.00000000",
        "has_range": false,
        "min_amount": null,
        "max_amount": null,
        "payment_method": "SEPA",
        "premium": "1.50",
        "price": 64000.4,
    }))
    .unwrap()
}

pub fn orders(ids: &[OrderId]) -> Vec<Order> {
    ids.iter().copied().map(order).collect()
}

/// What the next fetch should return.
pub enum Step {
    Book(Vec<OrderId>),
    Fail,
}

/// Replays a fixed list of books; empty once the script runs out.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    fetches: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Every fetch waits for the gate to be opened first.
    pub fn gated(steps: impl IntoIterator<Item = Step>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(steps)
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<Order>, FetchError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Book(ids)) => Ok(orders(&ids)),
            Some(Step::Fail) => Err(FetchError::Status(StatusCode::BAD_GATEWAY)),
            None => Ok(Vec::new()),
        }
    }
}

/// Remembers every body it was asked to publish.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(content.to_string());
        Ok(PublishReceipt {
            event_id: format!("event-{}", sent.len()),
            accepted: 1,
            failed: 0,
        })
    }
}

/// Every publish fails; counts attempts.
#[derive(Default)]
pub struct FailingPublisher {
    attempts: AtomicUsize,
}

impl FailingPublisher {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _content: &str) -> Result<PublishReceipt, PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PublishError::Other("all relays down".into()))
    }
}

/// A memory ledger that errors on lookups of `broken` ids, and on inserts of
/// ids registered with [`FlakyLedger::failing_inserts`].
#[derive(Default)]
pub struct FlakyLedger {
    pub inner: MemoryLedger,
    broken: HashSet<OrderId>,
    insert_broken: HashSet<OrderId>,
}

impl FlakyLedger {
    pub fn new(broken: impl IntoIterator<Item = OrderId>) -> Self {
        Self {
            inner: MemoryLedger::new(),
            broken: broken.into_iter().collect(),
            insert_broken: HashSet::new(),
        }
    }

    pub fn failing_inserts(mut self, ids: impl IntoIterator<Item = OrderId>) -> Self {
        self.insert_broken.extend(ids);
        self
    }
}

#[async_trait]
impl Ledger for FlakyLedger {
    async fn has(&self, id: OrderId) -> Result<bool, LedgerError> {
        if self.broken.contains(&id) {
            return Err(LedgerError::Unavailable("connection refused".into()));
        }
        self.inner.has(id).await
    }

    async fn insert(&self, id: OrderId) -> Result<InsertOutcome, LedgerError> {
        if self.insert_broken.contains(&id) {
            return Err(LedgerError::Unavailable("write rejected".into()));
        }
        self.inner.insert(id).await
    }
}
