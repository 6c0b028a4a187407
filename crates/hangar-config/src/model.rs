// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hangar plugin host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Hangar configuration.
///
/// All sections are optional and default to the values the runtime was tuned with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HangarConfig {
    /// Plugin tree location and trusted signing keys.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Process runtime timeouts and heartbeat cadence.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Capability adapter call bounds.
    #[serde(default)]
    pub adapters: AdaptersConfig,

    /// Installation and settings database.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Sealing key for plugin configuration.
    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where plugins live and which keys make a signature official.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Base directory laid out as `<category>/<plugin_id>/`.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Base64-encoded ed25519 public keys.
    #[serde(default)]
    pub official_keys: Vec<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            official_keys: Vec::new(),
        }
    }
}

fn default_base_dir() -> String {
    "plugins".to_string()
}

/// Bounds for every call the runtime makes on its own behalf.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default = "default_manifest_timeout_secs")]
    pub manifest_timeout_secs: u64,

    #[serde(default = "default_init_timeout_secs")]
    pub init_timeout_secs: u64,

    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,

    /// How long a freshly spawned plugin has to print its handshake line.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,

    /// How long `stop` waits for a killed child to be reaped.
    #[serde(default = "default_stop_grace_secs")]
    pub stop_grace_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            manifest_timeout_secs: default_manifest_timeout_secs(),
            init_timeout_secs: default_init_timeout_secs(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            health_timeout_secs: default_health_timeout_secs(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
            stop_grace_secs: default_stop_grace_secs(),
        }
    }
}

impl RuntimeConfig {
    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }
}

fn default_manifest_timeout_secs() -> u64 {
    5
}

fn default_init_timeout_secs() -> u64 {
    10
}

fn default_heartbeat_interval_secs() -> u64 {
    10
}

fn default_health_timeout_secs() -> u64 {
    2
}

fn default_handshake_timeout_secs() -> u64 {
    10
}

fn default_stop_grace_secs() -> u64 {
    2
}

/// Default bounds applied by capability adapters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdaptersConfig {
    /// Automation, SMS and KYC calls.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Payment provider calls.
    #[serde(default = "default_payment_timeout_secs")]
    pub payment_timeout_secs: u64,
}

impl Default for AdaptersConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            payment_timeout_secs: default_payment_timeout_secs(),
        }
    }
}

impl AdaptersConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn payment_timeout(&self) -> Duration {
        Duration::from_secs(self.payment_timeout_secs)
    }
}

fn default_call_timeout_secs() -> u64 {
    12
}

fn default_payment_timeout_secs() -> u64 {
    10
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("hangar").join("hangar.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("hangar.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Plugin configuration sealing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// 32-byte AES key as 64 hex characters. Empty disables sealing.
    #[serde(default)]
    pub master_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
