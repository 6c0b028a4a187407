// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 signing keypairs and trusted-key decoding. Keys travel as base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{SigningKey, VerifyingKey};
use hangar_core::HangarError;
use rand::rngs::OsRng;

/// An offline signing keypair used by the `sign` tool.
pub struct SigningKeypair {
    signing_key: SigningKey,
}

impl SigningKeypair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstructs a keypair from a base64 32-byte private key.
    pub fn from_base64(private_b64: &str) -> Result<Self, HangarError> {
        let bytes = STANDARD
            .decode(private_b64.trim())
            .map_err(|e| HangarError::InvalidInput(format!("private key is not base64: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            HangarError::InvalidInput(format!("private key must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&bytes),
        })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn private_base64(&self) -> String {
        STANDARD.encode(self.signing_key.to_bytes())
    }

    pub fn public_base64(&self) -> String {
        STANDARD.encode(self.verifying_key().to_bytes())
    }
}

/// Decodes one base64 public key.
pub fn decode_verifying_key(public_b64: &str) -> Result<VerifyingKey, HangarError> {
    let bytes = STANDARD
        .decode(public_b64.trim())
        .map_err(|e| HangarError::Config(format!("public key is not base64: {e}")))?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        HangarError::Config(format!("public key must be 32 bytes, got {}", v.len()))
    })?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| HangarError::Config(format!("invalid ed25519 public key: {e}")))
}

/// Decodes the configured official keys, failing on the first bad one.
pub fn decode_trusted_keys(keys: &[String]) -> Result<Vec<VerifyingKey>, HangarError> {
    keys.iter().map(|k| decode_verifying_key(k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_roundtrip() {
        let kp = SigningKeypair::generate();
        let restored = SigningKeypair::from_base64(&kp.private_base64()).unwrap();
        assert_eq!(restored.public_base64(), kp.public_base64());
        let public = decode_verifying_key(&kp.public_base64()).unwrap();
        assert_eq!(public, kp.verifying_key());
    }

    #[test]
    fn short_keys_are_rejected() {
        let short = STANDARD.encode([7u8; 16]);
        assert!(SigningKeypair::from_base64(&short).is_err());
        assert!(matches!(
            decode_verifying_key(&short),
            Err(HangarError::Config(msg)) if msg.contains("32 bytes")
        ));
    }

    #[test]
    fn decode_trusted_keys_reports_bad_entry() {
        let good = SigningKeypair::generate().public_base64();
        assert_eq!(decode_trusted_keys(&[good.clone()]).unwrap().len(), 1);
        assert!(decode_trusted_keys(&[good, "%%%".into()]).is_err());
    }
}
