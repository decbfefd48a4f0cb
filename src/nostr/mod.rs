//! Nostr publishing: keys, signed notes and the relay fan-out.
//!
//! The only thing the sync pipeline needs from here is [`Publisher`]. Calling
//! it twice with the same text produces two distinct events; deduplication is
//! the caller's job.

pub mod event;
pub mod keys;
mod pool;
pub mod relay;

pub use event::{Event, EventError, KIND_TEXT_NOTE};
pub use keys::{KeyError, Keys};
pub use pool::{RelayPool, DEFAULT_RELAY_TIMEOUT};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to build event: {0}")]
    Event(#[from] EventError),
    #[error("publish failed: {0}")]
    Other(String),
}

/// What happened to one published note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub event_id: String,
    /// Relays that acknowledged the event
    pub accepted: usize,
    /// Relays that failed or rejected it
    pub failed: usize,
}

impl PublishReceipt {
    pub fn new(event_id: String) -> Self {
        Self {
            event_id,
            accepted: 0,
            failed: 0,
        }
    }
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Sign `content` as a text note and broadcast it.
    ///
    /// Per-relay failures are reported in the receipt, not as an error.
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError>;
}

/// Signs notes but only logs them. Used by `--dry-run`.
#[derive(Debug, Clone)]
pub struct LogPublisher {
    keys: Keys,
}

impl LogPublisher {
    pub fn new(keys: Keys) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError> {
        let event = Event::text_note(&self.keys, content, chrono::Utc::now().timestamp())?;
        info!(event_id = %event.id, "Dry run, not sending:\n{}", event.content);
        Ok(PublishReceipt::new(event.id))
    }
}
