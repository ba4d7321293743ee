use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::ConfigError;

/// Checks `X-Signature-Ed25519` on incoming interaction requests.
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl InteractionVerifier {
    /// Build from the application's hex-encoded public key.
    pub fn from_hex(public_key: &str) -> Result<Self, ConfigError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| ConfigError::PublicKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ConfigError::PublicKey("expected 32 bytes".into()))?;
        let key =
            VerifyingKey::from_bytes(&bytes).map_err(|e| ConfigError::PublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn from_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// The signed message is `timestamp || body`.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        let Ok(sig) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(&sig) else {
            return false;
        };
        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);
        self.key.verify(&message, &sig).is_ok()
    }
}
