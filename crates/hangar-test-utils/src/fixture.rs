// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk plugin trees for tests.
//!
//! Fixture helpers panic on I/O failure; they only ever run inside tests.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

use hangar_verify::{MANIFEST_FILE, current_platform};

use crate::mock::{MOCK_CONFIG_FILE, MockBehavior};

/// A temporary `<base_dir>/<category>/<plugin_id>/` tree.
pub struct PluginTree {
    dir: TempDir,
}

impl PluginTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create plugin tree"),
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn plugin_dir(&self, category: &str, plugin_id: &str) -> PathBuf {
        self.dir.path().join(category).join(plugin_id)
    }

    /// Writes the fixture and returns its plugin directory.
    pub fn add(&self, fixture: &PluginFixture) -> PathBuf {
        fixture.write(self.base_dir())
    }
}

impl Default for PluginTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one plugin directory.
///
/// By default the manifest declares a binary for the current platform only,
/// backed by a placeholder file that cannot be executed. Use
/// [`PluginFixture::binary`] to copy a real executable instead.
#[derive(Debug, Clone)]
pub struct PluginFixture {
    category: String,
    plugin_id: String,
    declared_id: Option<String>,
    name: String,
    version: String,
    description: String,
    platforms: Vec<String>,
    capabilities: serde_json::Map<String, Value>,
    binary: Option<PathBuf>,
    behavior: Option<MockBehavior>,
}

impl PluginFixture {
    pub fn new(category: &str, plugin_id: &str) -> Self {
        Self {
            category: category.to_string(),
            plugin_id: plugin_id.to_string(),
            declared_id: None,
            name: plugin_id.to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            platforms: vec![current_platform()],
            capabilities: serde_json::Map::new(),
            binary: None,
            behavior: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Declare a different `plugin_id` in the manifest than the directory name.
    pub fn declared_id(mut self, id: &str) -> Self {
        self.declared_id = Some(id.to_string());
        self
    }

    /// Replace the declared platform keys.
    pub fn platforms(mut self, platforms: &[&str]) -> Self {
        self.platforms = platforms.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn sms(mut self) -> Self {
        self.capabilities.insert("sms".into(), json!({ "send": true }));
        self
    }

    pub fn payment(mut self, methods: &[&str]) -> Self {
        self.capabilities
            .insert("payment".into(), json!({ "methods": methods }));
        self
    }

    pub fn kyc(mut self) -> Self {
        self.capabilities
            .insert("kyc".into(), json!({ "start": true, "query_result": true }));
        self
    }

    pub fn automation(mut self) -> Self {
        self.capabilities.insert("automation".into(), json!({}));
        self
    }

    /// Copy this executable in as the plugin entry.
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Script for the mock plugin, written as `mock.json`.
    pub fn behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn manifest_json(&self) -> Value {
        let entry = self.entry_rel();
        let binaries: serde_json::Map<String, Value> = self
            .platforms
            .iter()
            .map(|p| (p.clone(), Value::String(entry.clone())))
            .collect();
        json!({
            "plugin_id": self.declared_id.as_deref().unwrap_or(&self.plugin_id),
            "name": self.name,
            "version": self.version,
            "description": self.description,
            "binaries": binaries,
            "capabilities": self.capabilities,
        })
    }

    /// Writes the plugin under `base_dir` and returns its directory.
    pub fn write(&self, base_dir: &Path) -> PathBuf {
        let dir = base_dir.join(&self.category).join(&self.plugin_id);
        let entry = dir.join(self.entry_rel());
        if let Some(parent) = entry.parent() {
            std::fs::create_dir_all(parent).expect("create plugin bin dir");
        }

        match &self.binary {
            Some(src) => {
                std::fs::copy(src, &entry).expect("copy plugin binary");
            }
            None => std::fs::write(&entry, b"placeholder, not executable").expect("write placeholder binary"),
        }

        let manifest = serde_json::to_string_pretty(&self.manifest_json()).expect("encode manifest");
        std::fs::write(dir.join(MANIFEST_FILE), manifest).expect("write manifest");

        if let Some(behavior) = &self.behavior {
            let script = serde_json::to_string_pretty(behavior).expect("encode mock script");
            std::fs::write(dir.join(MOCK_CONFIG_FILE), script).expect("write mock script");
        }
        dir
    }

    fn entry_rel(&self) -> String {
        if cfg!(windows) {
            format!("bin/{}.exe", self.plugin_id)
        } else {
            format!("bin/{}", self.plugin_id)
        }
    }
}
