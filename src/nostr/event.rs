//! NIP-01 events.

use super::keys::{verify_id, KeyError, Keys};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Short text note.
pub const KIND_TEXT_NOTE: u16 = 1;

pub type Tags = Vec<Vec<String>>;

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("event id does not match its content")]
    IdMismatch,
    #[error("event id or signature is not valid hex")]
    Encoding,
}

/// A signed event, in the shape relays expect on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Tags,
    pub content: String,
    pub sig: String,
}

impl Event {
    /// Build and sign a kind-1 note with no tags.
    pub fn text_note(keys: &Keys, content: &str, created_at: i64) -> Result<Self, EventError> {
        Self::sign(keys, KIND_TEXT_NOTE, Vec::new(), content, created_at)
    }

    pub fn sign(
        keys: &Keys,
        kind: u16,
        tags: Tags,
        content: &str,
        created_at: i64,
    ) -> Result<Self, EventError> {
        let pubkey = keys.public_key_hex();
        let id = compute_id(&pubkey, created_at, kind, &tags, content)?;
        let sig = keys.sign_id(&id)?;

        Ok(Self {
            id: hex::encode(id),
            pubkey,
            created_at,
            kind,
            tags,
            content: content.to_string(),
            sig: hex::encode(sig),
        })
    }

    /// Recompute the id and check the signature against `pubkey`.
    pub fn verify(&self) -> Result<(), EventError> {
        let id = compute_id(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        )?;
        if hex::encode(id) != self.id {
            return Err(EventError::IdMismatch);
        }
        let sig = hex::decode(&self.sig).map_err(|_| EventError::Encoding)?;
        verify_id(&self.pubkey, &id, &sig)?;
        Ok(())
    }
}

/// sha256 over the canonical `[0, pubkey, created_at, kind, tags, content]` array.
pub fn compute_id(
    pubkey: &str,
    created_at: i64,
    kind: u16,
    tags: &Tags,
    content: &str,
) -> Result<[u8; 32], EventError> {
    let canonical = serde_json::to_vec(&(0u8, pubkey, created_at, kind, tags, content))?;
    Ok(Sha256::digest(&canonical).into())
}
