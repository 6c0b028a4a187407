// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of a loaded [`HangarConfig`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::diagnostic::ConfigError;
use crate::model::HangarConfig;

/// Validate a config, collecting every failure instead of stopping at the first.
pub fn validate_config(config: &HangarConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.plugins.base_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "plugins.base_dir must not be empty".to_string(),
        });
    }

    for (i, key) in config.plugins.official_keys.iter().enumerate() {
        match STANDARD.decode(key.trim()) {
            Ok(bytes) if bytes.len() == 32 => {}
            Ok(bytes) => errors.push(ConfigError::Validation {
                message: format!(
                    "plugins.official_keys[{i}] must decode to 32 bytes, got {}",
                    bytes.len()
                ),
            }),
            Err(e) => errors.push(ConfigError::Validation {
                message: format!("plugins.official_keys[{i}] is not valid base64: {e}"),
            }),
        }
    }

    let rt = &config.runtime;
    for (name, value) in [
        ("runtime.manifest_timeout_secs", rt.manifest_timeout_secs),
        ("runtime.init_timeout_secs", rt.init_timeout_secs),
        ("runtime.heartbeat_interval_secs", rt.heartbeat_interval_secs),
        ("runtime.health_timeout_secs", rt.health_timeout_secs),
        ("runtime.handshake_timeout_secs", rt.handshake_timeout_secs),
        ("adapters.call_timeout_secs", config.adapters.call_timeout_secs),
        (
            "adapters.payment_timeout_secs",
            config.adapters.payment_timeout_secs,
        ),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be at least 1"),
            });
        }
    }

    if rt.health_timeout_secs >= rt.heartbeat_interval_secs && rt.heartbeat_interval_secs > 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "runtime.health_timeout_secs ({}) must be shorter than runtime.heartbeat_interval_secs ({})",
                rt.health_timeout_secs, rt.heartbeat_interval_secs
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let master_key = config.vault.master_key.trim();
    if !master_key.is_empty() {
        match hex::decode(master_key) {
            Ok(bytes) if bytes.len() == 32 => {}
            _ => errors.push(ConfigError::Validation {
                message: "vault.master_key must be 64 hex characters".to_string(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = HangarConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_base_dir_fails_validation() {
        let mut config = HangarConfig::default();
        config.plugins.base_dir = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "plugins.base_dir"));
    }

    #[test]
    fn bad_official_key_fails_validation() {
        let mut config = HangarConfig::default();
        config.plugins.official_keys = vec!["not base64!".into(), STANDARD.encode([1u8; 16])];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "official_keys[0]"));
        assert!(has_message(&errors, "official_keys[1] must decode to 32 bytes"));
    }

    #[test]
    fn health_timeout_must_be_shorter_than_interval() {
        let mut config = HangarConfig::default();
        config.runtime.health_timeout_secs = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "health_timeout_secs"));
    }

    #[test]
    fn zero_timeouts_are_reported_together() {
        let mut config = HangarConfig::default();
        config.runtime.init_timeout_secs = 0;
        config.adapters.call_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "runtime.init_timeout_secs"));
        assert!(has_message(&errors, "adapters.call_timeout_secs"));
    }

    #[test]
    fn master_key_must_be_32_bytes_of_hex() {
        let mut config = HangarConfig::default();
        config.vault.master_key = "abcd".into();
        assert!(has_message(
            &validate_config(&config).unwrap_err(),
            "vault.master_key"
        ));
        config.vault.master_key = "ab".repeat(32);
        assert!(validate_config(&config).is_ok());
    }
}
