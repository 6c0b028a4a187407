// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Script shared between fixtures and the `hangar-mock-plugin` binary.
//!
//! The mock reads [`MOCK_CONFIG_FILE`] from its working directory (the plugin
//! directory) at startup and appends its pid to [`SPAWN_LOG_FILE`], so tests
//! can both steer its answers and count how many processes were spawned.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const MOCK_CONFIG_FILE: &str = "mock.json";
pub const SPAWN_LOG_FILE: &str = "spawns.log";

/// Scripted behaviour of one mock plugin directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockBehavior {
    /// Non-empty makes `Init` answer not-ok with this text.
    pub init_error: String,
    pub init_delay_ms: u64,
    pub manifest_delay_ms: u64,
    /// Replaces the manifest's `plugin_id` in `GetManifest` answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_plugin_id: Option<String>,
    /// Exit the process this long after a successful `Init`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_after_init_ms: Option<u64>,
    pub health_delay_ms: u64,
    /// Non-empty makes `ValidateConfig` answer not-ok.
    pub validate_error: String,
    /// Non-empty makes `ReloadConfig` answer not-ok.
    pub reload_error: String,
    /// Leave `ReloadConfig` unimplemented.
    pub no_reload: bool,
    /// Delay applied to every capability call.
    pub call_delay_ms: u64,
    /// Payload returned by `automation.GetMonitor`.
    pub monitor_json: String,
    pub config_schema: String,
}

impl MockBehavior {
    /// Reads the script from a plugin directory. Missing or broken files mean defaults.
    pub fn load(plugin_dir: &Path) -> Self {
        std::fs::read_to_string(plugin_dir.join(MOCK_CONFIG_FILE))
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

/// Records one spawn in the plugin directory.
pub fn record_spawn(plugin_dir: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(plugin_dir.join(SPAWN_LOG_FILE))?;
    writeln!(file, "{}", std::process::id())
}

/// How many times the mock was spawned in `plugin_dir`.
pub fn spawn_count(plugin_dir: &Path) -> usize {
    std::fs::read_to_string(plugin_dir.join(SPAWN_LOG_FILE))
        .map(|log| log.lines().filter(|l| !l.trim().is_empty()).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_log_counts_lines() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(spawn_count(dir.path()), 0);
        record_spawn(dir.path()).unwrap();
        record_spawn(dir.path()).unwrap();
        assert_eq!(spawn_count(dir.path()), 2);
    }

    #[test]
    fn behavior_defaults_when_absent_or_broken() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(MockBehavior::load(dir.path()), MockBehavior::default());
        std::fs::write(dir.path().join(MOCK_CONFIG_FILE), "{nope").unwrap();
        assert_eq!(MockBehavior::load(dir.path()), MockBehavior::default());
        std::fs::write(dir.path().join(MOCK_CONFIG_FILE), r#"{"init_error":"bad key"}"#).unwrap();
        assert_eq!(MockBehavior::load(dir.path()).init_error, "bad key");
    }
}
