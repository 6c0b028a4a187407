// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store implementations for deterministic tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use hangar_core::{HangarError, InstallationStore, PluginInstallation, Setting, SettingsStore};

/// Installation rows keyed by `(category, plugin_id)`, with the same upsert
/// semantics as the SQLite store.
pub struct MemoryInstallationStore {
    rows: Mutex<BTreeMap<(String, String), PluginInstallation>>,
    next_id: AtomicI64,
}

impl MemoryInstallationStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored installations.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

impl Default for MemoryInstallationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstallationStore for MemoryInstallationStore {
    async fn list_installations(&self) -> Result<Vec<PluginInstallation>, HangarError> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn get_installation(
        &self,
        category: &str,
        plugin_id: &str,
    ) -> Result<Option<PluginInstallation>, HangarError> {
        let key = (category.to_string(), plugin_id.to_string());
        Ok(self.rows.lock().await.get(&key).cloned())
    }

    async fn find_by_instance_id(
        &self,
        instance_id: &str,
    ) -> Result<Option<PluginInstallation>, HangarError> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|row| row.instance_id == instance_id)
            .cloned())
    }

    async fn upsert_installation(&self, installation: &PluginInstallation) -> Result<(), HangarError> {
        let key = (installation.category.clone(), installation.plugin_id.clone());
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&key) {
            Some(row) => {
                row.enabled = installation.enabled;
                row.signature_status = installation.signature_status;
                row.config_cipher = installation.config_cipher.clone();
                row.updated_at = installation.updated_at;
            }
            None => {
                let mut row = installation.clone();
                row.id = self.next_id.fetch_add(1, Ordering::Relaxed);
                rows.insert(key, row);
            }
        }
        Ok(())
    }
}

/// String-keyed settings held in memory.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, Setting>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, HangarError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn upsert_setting(&self, setting: &Setting) -> Result<(), HangarError> {
        self.values
            .lock()
            .await
            .insert(setting.key.clone(), setting.clone());
        Ok(())
    }
}
