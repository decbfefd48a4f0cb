use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("secret key must be 64 hex characters")]
    Encoding,
    #[error("secret key is not a valid secp256k1 scalar")]
    InvalidSecret,
    #[error("public key is not a valid x-only secp256k1 point")]
    InvalidPublic,
    #[error("signing failed: {0}")]
    Signing(#[source] k256::schnorr::signature::Error),
    #[error("signature does not verify")]
    BadSignature,
}

/// BIP-340 key pair used to sign events.
#[derive(Clone)]
pub struct Keys {
    secret: SigningKey,
}

impl Keys {
    /// Parse a hex-encoded 32-byte secret key.
    pub fn from_hex(secret_hex: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(secret_hex.trim()).map_err(|_| KeyError::Encoding)?;
        if bytes.len() != 32 {
            return Err(KeyError::Encoding);
        }
        let secret = SigningKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidSecret)?;
        Ok(Self { secret })
    }

    /// x-only public key, lowercase hex, as used in the event `pubkey` field.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.secret.verifying_key().to_bytes())
    }

    /// Sign a 32-byte event id.
    pub(crate) fn sign_id(&self, id: &[u8; 32]) -> Result<[u8; 64], KeyError> {
        let aux: [u8; 32] = rand::random();
        let sig = self.secret.sign_raw(id, &aux).map_err(KeyError::Signing)?;
        Ok(sig.to_bytes())
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Check a BIP-340 signature over `id` by the x-only key `pubkey_hex`.
pub fn verify_id(pubkey_hex: &str, id: &[u8; 32], sig: &[u8]) -> Result<(), KeyError> {
    let pubkey = hex::decode(pubkey_hex).map_err(|_| KeyError::InvalidPublic)?;
    let key = VerifyingKey::from_bytes(&pubkey).map_err(|_| KeyError::InvalidPublic)?;
    let sig = Signature::try_from(sig).map_err(|_| KeyError::BadSignature)?;
    key.verify_raw(id, &sig).map_err(|_| KeyError::BadSignature)
}
