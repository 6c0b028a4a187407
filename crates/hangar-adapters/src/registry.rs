// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog of payment providers built from live plugins.
//!
//! Nothing is cached. Every listing and lookup re-reads the installation
//! store and the runtime table, so disabling or stopping a plugin removes its
//! providers on the next call.

use std::sync::Arc;
use std::time::Duration;

use hangar_core::{HangarError, InstallationStore, PluginInstallation};
use hangar_runtime::{PluginRuntime, RunningPlugin};

use crate::DEFAULT_PAYMENT_TIMEOUT;
use crate::payment::PluginPaymentProvider;

/// Separator between plugin id and method in a provider key.
const KEY_SEPARATOR: char = '.';

#[derive(Clone)]
pub struct PaymentProviderRegistry {
    installations: Arc<dyn InstallationStore>,
    runtime: Arc<PluginRuntime>,
    timeout: Duration,
}

impl PaymentProviderRegistry {
    pub fn new(installations: Arc<dyn InstallationStore>, runtime: Arc<PluginRuntime>) -> Self {
        Self {
            installations,
            runtime,
            timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }

    /// Timeout handed to every provider this registry builds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Providers for every method of every enabled, running, payment-capable plugin.
    ///
    /// Methods that are blank or contain the key separator are skipped.
    pub async fn list_providers(&self) -> Result<Vec<PluginPaymentProvider>, HangarError> {
        let mut out = Vec::new();
        for inst in self.installations.list_installations().await? {
            let Some(running) = self.live_payment_plugin(&inst) else {
                continue;
            };
            for method in payment_methods(&running) {
                let method = method.trim();
                if method.is_empty() || method.contains(KEY_SEPARATOR) {
                    continue;
                }
                out.push(self.provider(&inst, &running, method));
            }
        }
        out.sort_by_key(|p| (p.plugin_id().to_string(), p.method().to_string()));
        Ok(out)
    }

    /// Resolve `<plugin_id>.<method>`.
    ///
    /// Malformed keys, unknown methods, and disabled or stopped plugins all
    /// yield `Ok(None)`. Only store failures are errors.
    pub async fn get_provider_by_key(&self, key: &str) -> Result<Option<PluginPaymentProvider>, HangarError> {
        let Some((plugin_id, method)) = key.trim().split_once(KEY_SEPARATOR) else {
            return Ok(None);
        };
        let (plugin_id, method) = (plugin_id.trim(), method.trim());
        if plugin_id.is_empty() || method.is_empty() {
            return Ok(None);
        }

        for inst in self.installations.list_installations().await? {
            if inst.plugin_id != plugin_id {
                continue;
            }
            let Some(running) = self.live_payment_plugin(&inst) else {
                continue;
            };
            if payment_methods(&running).iter().any(|m| m == method) {
                return Ok(Some(self.provider(&inst, &running, method)));
            }
        }
        Ok(None)
    }

    fn live_payment_plugin(&self, inst: &PluginInstallation) -> Option<Arc<RunningPlugin>> {
        if !inst.enabled {
            return None;
        }
        let running = self.runtime.get_running(&inst.category, &inst.plugin_id)?;
        // A stale table entry from an earlier instance does not count.
        if running.instance_id() != inst.instance_id || running.payment().is_err() {
            return None;
        }
        Some(running)
    }

    fn provider(&self, inst: &PluginInstallation, running: &RunningPlugin, method: &str) -> PluginPaymentProvider {
        PluginPaymentProvider::new(
            self.runtime.clone(),
            &inst.category,
            &inst.plugin_id,
            &inst.instance_id,
            method,
            &running.manifest().name,
        )
        .with_timeout(self.timeout)
    }
}

fn payment_methods(running: &RunningPlugin) -> Vec<String> {
    running
        .manifest()
        .payment
        .as_ref()
        .map(|p| p.methods.clone())
        .unwrap_or_default()
}
