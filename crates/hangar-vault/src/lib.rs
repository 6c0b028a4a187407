// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sealing of plugin configuration at rest.
//!
//! A plugin's config JSON is stored as `base64(nonce || ciphertext)` under a
//! master key taken from `[vault] master_key`. Without a master key the
//! sealer refuses to seal, so configuration is never stored in plaintext.
//! Plugins with no stored configuration still start.

pub mod crypto;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hangar_core::HangarError;

use crate::crypto::KEY_LEN;

#[derive(Clone)]
pub struct ConfigSealer {
    key: Option<[u8; KEY_LEN]>,
}

impl ConfigSealer {
    /// Build from a 64-character hex key. An empty string gives a sealer
    /// that refuses to seal.
    pub fn from_hex(master_key: &str) -> Result<Self, HangarError> {
        let master_key = master_key.trim();
        if master_key.is_empty() {
            tracing::warn!("vault master key not set, plugin configuration cannot be stored");
            return Ok(Self::disabled());
        }
        let bytes = hex::decode(master_key)
            .map_err(|e| HangarError::Vault(format!("master key is not valid hex: {e}")))?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            HangarError::Vault(format!("master key must be {KEY_LEN} bytes ({} hex characters)", KEY_LEN * 2))
        })?;
        Ok(Self { key: Some(key) })
    }

    pub fn with_key(key: [u8; KEY_LEN]) -> Self {
        Self { key: Some(key) }
    }

    pub fn disabled() -> Self {
        Self { key: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, HangarError> {
        let key = self.key.as_ref().ok_or_else(no_master_key)?;
        Ok(STANDARD.encode(crypto::seal(key, plaintext.as_bytes())?))
    }

    /// An empty cipher opens to an empty string.
    pub fn open(&self, cipher: &str) -> Result<String, HangarError> {
        let cipher = cipher.trim();
        if cipher.is_empty() {
            return Ok(String::new());
        }
        let key = self.key.as_ref().ok_or_else(no_master_key)?;
        let sealed = STANDARD
            .decode(cipher)
            .map_err(|e| HangarError::Vault(format!("sealed config is not base64: {e}")))?;
        let plaintext = crypto::open(key, &sealed)?;
        String::from_utf8(plaintext).map_err(|_| HangarError::Vault("sealed config is not UTF-8".to_string()))
    }
}

fn no_master_key() -> HangarError {
    HangarError::Vault("vault.master_key is not set".to_string())
}

impl std::fmt::Debug for ConfigSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSealer")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}
