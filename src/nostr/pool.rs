use super::event::Event;
use super::keys::Keys;
use super::relay::RelayConnection;
use super::{PublishError, PublishReceipt, Publisher};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on connect + send + `OK` for a single relay.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(15);

/// Signs notes with one key and fans them out to every configured relay.
#[derive(Debug, Clone)]
pub struct RelayPool {
    keys: Keys,
    relays: Vec<Arc<RelayConnection>>,
}

impl RelayPool {
    pub fn new<I, S>(keys: Keys, relay_urls: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let relays = relay_urls
            .into_iter()
            .map(|url| Arc::new(RelayConnection::new(url, timeout)))
            .collect();
        Self { keys, relays }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn relay_urls(&self) -> impl Iterator<Item = &str> {
        self.relays.iter().map(|r| r.url())
    }
}

#[async_trait]
impl Publisher for RelayPool {
    async fn publish(&self, content: &str) -> Result<PublishReceipt, PublishError> {
        let event = Event::text_note(&self.keys, content, chrono::Utc::now().timestamp())?;

        let results = join_all(self.relays.iter().map(|relay| relay.send_event(&event))).await;

        let mut receipt = PublishReceipt::new(event.id.clone());
        for (relay, result) in self.relays.iter().zip(results) {
            match result {
                Ok(message) => {
                    debug!(relay = relay.url(), event_id = %event.id, message = %message, "Relay accepted event");
                    receipt.accepted += 1;
                }
                Err(e) => {
                    warn!(relay = relay.url(), event_id = %event.id, "Relay did not take event: {e}");
                    receipt.failed += 1;
                }
            }
        }

        Ok(receipt)
    }
}
