//! One persistent websocket connection to a relay.

use super::event::Event;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("connect failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("receive failed: {0}")]
    Receive(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("connection closed by relay")]
    Closed,
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("event rejected: {0}")]
    Rejected(String),
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Lazily connected relay. The socket is kept between publishes and dropped
/// on any error so the next publish reconnects.
pub struct RelayConnection {
    url: String,
    timeout: Duration,
    stream: Mutex<Option<WsStream>>,
}

impl RelayConnection {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            stream: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `["EVENT", event]` and wait for the relay's `OK` for that id.
    ///
    /// Returns the relay's message on acceptance.
    pub async fn send_event(&self, event: &Event) -> Result<String, RelayError> {
        let frame = serde_json::to_string(&("EVENT", event))?;
        let mut guard = self.stream.lock().await;

        let result = self.exchange(&mut guard, frame, &event.id).await;
        if matches!(
            result,
            Err(RelayError::Connect(_)
                | RelayError::Send(_)
                | RelayError::Receive(_)
                | RelayError::Closed
                | RelayError::Timeout(_))
        ) {
            // Stale or broken socket; reconnect next time.
            *guard = None;
        }
        result
    }

    async fn exchange(
        &self,
        slot: &mut Option<WsStream>,
        frame: String,
        event_id: &str,
    ) -> Result<String, RelayError> {
        let deadline = Instant::now() + self.timeout;

        if slot.is_none() {
            let (ws, _) = tokio::time::timeout_at(
                deadline,
                tokio_tungstenite::connect_async(self.url.as_str()),
            )
            .await
            .map_err(|_| RelayError::Timeout(self.timeout))?
            .map_err(RelayError::Connect)?;
            info!(relay = %self.url, "Connected to relay");
            *slot = Some(ws);
        }
        let ws = slot.as_mut().ok_or(RelayError::Closed)?;

        tokio::time::timeout_at(deadline, ws.send(Message::Text(frame.into())))
            .await
            .map_err(|_| RelayError::Timeout(self.timeout))?
            .map_err(RelayError::Send)?;

        loop {
            let msg = tokio::time::timeout_at(deadline, ws.next())
                .await
                .map_err(|_| RelayError::Timeout(self.timeout))?;

            match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = parse_reply(text.as_str(), event_id) {
                        return reply;
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    tokio::time::timeout_at(deadline, ws.send(Message::Pong(data)))
                        .await
                        .map_err(|_| RelayError::Timeout(self.timeout))?
                        .map_err(RelayError::Send)?;
                }
                Some(Ok(Message::Close(_))) | None => return Err(RelayError::Closed),
                Some(Err(e)) => return Err(RelayError::Receive(e)),
                _ => {} // binary and pong frames
            }
        }
    }
}

impl std::fmt::Debug for RelayConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConnection")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Interpret one relay frame. `None` means it isn't the reply we're waiting for.
fn parse_reply(text: &str, event_id: &str) -> Option<Result<String, RelayError>> {
    let Ok(Value::Array(parts)) = serde_json::from_str::<Value>(text) else {
        debug!(frame = text, "Ignoring non-array relay frame");
        return None;
    };

    match parts.first().and_then(Value::as_str) {
        Some("OK") if parts.get(1).and_then(Value::as_str) == Some(event_id) => {
            let accepted = parts.get(2).and_then(Value::as_bool).unwrap_or(false);
            let message = parts
                .get(3)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(if accepted {
                Ok(message)
            } else {
                Err(RelayError::Rejected(message))
            })
        }
        Some("NOTICE") => {
            warn!(notice = ?parts.get(1), "Relay notice");
            None
        }
        _ => None,
    }
}
