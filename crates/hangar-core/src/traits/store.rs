// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow persistence interfaces consumed by discovery and the manager.

use async_trait::async_trait;

use crate::error::HangarError;
use crate::types::{PluginInstallation, Setting};

/// Persists one record per `(category, plugin_id)`.
///
/// `upsert_installation` is keyed by `(category, plugin_id)`; implementations
/// keep the existing `id`, `instance_id` and `created_at` when the row exists.
#[async_trait]
pub trait InstallationStore: Send + Sync {
    async fn list_installations(&self) -> Result<Vec<PluginInstallation>, HangarError>;

    async fn get_installation(
        &self,
        category: &str,
        plugin_id: &str,
    ) -> Result<Option<PluginInstallation>, HangarError>;

    async fn find_by_instance_id(
        &self,
        instance_id: &str,
    ) -> Result<Option<PluginInstallation>, HangarError>;

    async fn upsert_installation(&self, installation: &PluginInstallation)
    -> Result<(), HangarError>;
}

/// String-keyed settings, used for the bootstrap flag.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, HangarError>;

    async fn upsert_setting(&self, setting: &Setting) -> Result<(), HangarError>;
}
