// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-facing plugin management.
//!
//! [`PluginManager`] ties the installation store, the process runtime and the
//! config vault together: enabling, configuring and starting installed plugins.

use std::sync::Arc;

use hangar_core::{HangarError, PluginInstallation, SignatureStatus};
use hangar_protocol::lifecycle::{ConfigSchema, Manifest};
use hangar_protocol::rpc::codes;
use hangar_runtime::{HealthSnapshot, PluginRuntime, RunningPlugin};
use hangar_vault::ConfigSealer;
use hangar_verify::{DiskManifest, read_manifest};

use crate::discovery::{BootstrapReport, DiscoverItem, Discovery};

/// An installation joined with its on-disk manifest and live state.
#[derive(Debug, Clone)]
pub struct InstalledPlugin {
    pub installation: PluginInstallation,
    /// `None` when the plugin directory is gone or its manifest is unreadable.
    pub manifest: Option<DiskManifest>,
    pub running: bool,
    pub pid: Option<u32>,
    pub health: Option<HealthSnapshot>,
}

impl InstalledPlugin {
    pub fn name(&self) -> &str {
        self.manifest.as_ref().map(|m| m.name.as_str()).unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.manifest.as_ref().map(|m| m.version.as_str()).unwrap_or_default()
    }
}

pub struct PluginManager {
    discovery: Discovery,
    runtime: Arc<PluginRuntime>,
    sealer: ConfigSealer,
}

impl PluginManager {
    pub fn new(discovery: Discovery, runtime: Arc<PluginRuntime>, sealer: ConfigSealer) -> Self {
        Self {
            discovery,
            runtime,
            sealer,
        }
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn runtime(&self) -> &Arc<PluginRuntime> {
        &self.runtime
    }

    pub async fn bootstrap_from_disk(&self) -> Result<BootstrapReport, HangarError> {
        self.discovery.bootstrap_from_disk().await
    }

    pub async fn discover_on_disk(&self) -> Result<Vec<DiscoverItem>, HangarError> {
        self.discovery.discover_on_disk().await
    }

    pub async fn import_from_disk(
        &self,
        category: &str,
        plugin_id: &str,
    ) -> Result<PluginInstallation, HangarError> {
        self.discovery.import_from_disk(category, plugin_id).await
    }

    pub fn signature_status_on_disk(
        &self,
        category: &str,
        plugin_id: &str,
    ) -> Result<SignatureStatus, HangarError> {
        self.discovery.signature_status_on_disk(category, plugin_id)
    }

    /// Every installation, ordered by key.
    pub async fn list(&self) -> Result<Vec<InstalledPlugin>, HangarError> {
        let mut installations = self.discovery.installations().list_installations().await?;
        installations.sort_by(|a, b| a.key().cmp(&b.key()));

        Ok(installations
            .into_iter()
            .map(|installation| {
                let dir = self
                    .discovery
                    .plugin_dir(&installation.category, &installation.plugin_id);
                let manifest = read_manifest(&dir).ok();
                let running = self
                    .runtime
                    .get_running(&installation.category, &installation.plugin_id);
                InstalledPlugin {
                    installation,
                    manifest,
                    running: running.is_some(),
                    pid: running.as_ref().and_then(|p| p.pid()),
                    health: running.map(|p| p.health()),
                }
            })
            .collect())
    }

    /// Persist the enabled flag. Running processes are left alone.
    pub async fn set_enabled(
        &self,
        category: &str,
        plugin_id: &str,
        enabled: bool,
    ) -> Result<PluginInstallation, HangarError> {
        let mut installation = self.installation(category, plugin_id).await?;
        if installation.enabled != enabled {
            installation.enabled = enabled;
            installation.updated_at = chrono::Utc::now();
            self.discovery
                .installations()
                .upsert_installation(&installation)
                .await?;
        }
        tracing::info!(
            category = %installation.category,
            plugin_id = %installation.plugin_id,
            enabled,
            "plugin enablement updated"
        );
        Ok(installation)
    }

    /// Open the stored configuration and start the plugin process.
    pub async fn start_installation(&self, category: &str, plugin_id: &str) -> Result<Manifest, HangarError> {
        let installation = self.installation(category, plugin_id).await?;
        self.start(&installation).await
    }

    pub async fn stop_installation(&self, category: &str, plugin_id: &str) {
        self.runtime.stop(category, plugin_id).await;
    }

    /// Start every enabled installation, returning how many are running.
    ///
    /// A failing plugin is logged and skipped.
    pub async fn start_enabled(&self) -> Result<usize, HangarError> {
        let installations = self.discovery.installations().list_installations().await?;
        let mut started = 0;
        for installation in installations.iter().filter(|i| i.enabled) {
            match self.start(installation).await {
                Ok(manifest) => {
                    started += 1;
                    tracing::info!(
                        category = %installation.category,
                        plugin_id = %installation.plugin_id,
                        version = %manifest.version,
                        "plugin started"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        category = %installation.category,
                        plugin_id = %installation.plugin_id,
                        error = %e,
                        "failed to start plugin"
                    );
                }
            }
        }
        Ok(started)
    }

    /// The configuration schema served by a running plugin.
    pub async fn config_schema(&self, category: &str, plugin_id: &str) -> Result<ConfigSchema, HangarError> {
        let running = self.require_running(category, plugin_id)?;
        running
            .core()
            .get_config_schema(self.runtime.settings().manifest_timeout)
            .await
    }

    /// Validate, seal and store new configuration, then hot-reload it.
    ///
    /// Validation and reload only happen when the plugin is running. A plugin
    /// without `ReloadConfig` picks the new config up on its next start.
    pub async fn set_config(
        &self,
        category: &str,
        plugin_id: &str,
        config_json: &str,
    ) -> Result<PluginInstallation, HangarError> {
        serde_json::from_str::<serde_json::Value>(config_json)
            .map_err(|e| HangarError::Config(format!("config is not valid JSON: {e}")))?;
        let mut installation = self.installation(category, plugin_id).await?;
        let running = self
            .runtime
            .get_running(&installation.category, &installation.plugin_id);
        let timeout = self.runtime.settings().init_timeout;

        if let Some(plugin) = &running {
            let verdict = plugin.core().validate_config(config_json, timeout).await?;
            if !verdict.ok {
                return Err(HangarError::Rejected(or_fallback(verdict.error, "invalid config")));
            }
        }

        installation.config_cipher = self.sealer.seal(config_json)?;
        installation.updated_at = chrono::Utc::now();
        self.discovery
            .installations()
            .upsert_installation(&installation)
            .await?;
        tracing::info!(
            category = %installation.category,
            plugin_id = %installation.plugin_id,
            "plugin config stored"
        );

        if let Some(plugin) = running {
            match plugin.core().reload_config(config_json, timeout).await {
                Ok(resp) if !resp.ok => {
                    return Err(HangarError::Rejected(or_fallback(resp.error, "reload config failed")));
                }
                Ok(_) => {}
                Err(e) if is_unimplemented(&e) => {
                    tracing::info!(
                        plugin = %plugin.key(),
                        "plugin does not hot-reload; config applies on next start"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(installation)
    }

    async fn start(&self, installation: &PluginInstallation) -> Result<Manifest, HangarError> {
        let config_json = self.sealer.open(&installation.config_cipher)?;
        self.runtime
            .start(
                &installation.category,
                &installation.plugin_id,
                &installation.instance_id,
                &config_json,
            )
            .await
    }

    async fn installation(&self, category: &str, plugin_id: &str) -> Result<PluginInstallation, HangarError> {
        let (category, plugin_id) = (category.trim(), plugin_id.trim());
        if category.is_empty() || plugin_id.is_empty() {
            return Err(HangarError::InvalidInput("invalid plugin".to_string()));
        }
        self.discovery
            .installations()
            .get_installation(category, plugin_id)
            .await?
            .ok_or_else(|| HangarError::NotFound(format!("plugin {category}:{plugin_id} is not installed")))
    }

    fn require_running(&self, category: &str, plugin_id: &str) -> Result<Arc<RunningPlugin>, HangarError> {
        self.runtime
            .get_running(category, plugin_id)
            .ok_or_else(|| HangarError::NotRunning(format!("{}:{}", category.trim(), plugin_id.trim())))
    }
}

fn or_fallback(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn is_unimplemented(err: &HangarError) -> bool {
    match err {
        HangarError::Rpc { code, .. } => *code == codes::UNIMPLEMENTED,
        other => other.is_not_supported(),
    }
}
