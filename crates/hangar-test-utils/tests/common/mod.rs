// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hangar_runtime::{PluginRuntime, RuntimeSettings};
use hangar_test_utils::{PluginFixture, PluginTree};

pub fn mock_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hangar-mock-plugin"))
}

/// A fixture whose entry is the real mock plugin binary.
pub fn mock_plugin(category: &str, plugin_id: &str) -> PluginFixture {
    PluginFixture::new(category, plugin_id).binary(mock_bin())
}

pub fn fast_settings() -> RuntimeSettings {
    RuntimeSettings {
        handshake_timeout: Duration::from_secs(10),
        manifest_timeout: Duration::from_secs(5),
        init_timeout: Duration::from_secs(5),
        heartbeat_interval: Duration::from_millis(50),
        health_timeout: Duration::from_secs(2),
        stop_grace: Duration::from_secs(2),
    }
}

pub fn runtime_for(tree: &PluginTree) -> Arc<PluginRuntime> {
    Arc::new(PluginRuntime::new(tree.base_dir(), fast_settings()))
}

/// Polls `cond` every 20ms until it holds or `within` elapses.
pub async fn eventually(within: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
