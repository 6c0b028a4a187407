// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The runtime table of live plugin processes.
//!
//! At most one process runs per `(category, plugin_id)`. Concurrent starts of
//! the same key share a single launch: the first caller leads, later callers
//! wait on its outcome. `stop` may race a launch; the leader then kills the
//! freshly started process instead of registering it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hangar_config::model::RuntimeConfig;
use hangar_core::HangarError;
use hangar_protocol::Service;
use hangar_protocol::lifecycle::Manifest;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::clients::{AutomationClient, CoreClient, KycClient, PaymentClient, SmsClient};
use crate::connection::RpcConnection;
use crate::handshake::read_handshake;
use crate::heartbeat::{self, HeartbeatTiming};
use crate::plugin::{Clients, HealthSnapshot, PluginKey, RunningPlugin};
use crate::process::{self, Spawned};

/// Timeouts governing a plugin's lifecycle.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub handshake_timeout: Duration,
    pub manifest_timeout: Duration,
    pub init_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub health_timeout: Duration,
    pub stop_grace: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(10),
            manifest_timeout: Duration::from_secs(5),
            init_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(10),
            health_timeout: Duration::from_secs(2),
            stop_grace: Duration::from_secs(2),
        }
    }
}

impl From<&RuntimeConfig> for RuntimeSettings {
    fn from(cfg: &RuntimeConfig) -> Self {
        Self {
            handshake_timeout: cfg.handshake_timeout(),
            manifest_timeout: cfg.manifest_timeout(),
            init_timeout: cfg.init_timeout(),
            heartbeat_interval: cfg.heartbeat_interval(),
            health_timeout: cfg.health_timeout(),
            stop_grace: cfg.stop_grace(),
        }
    }
}

type StartOutcome = Result<Manifest, HangarError>;

struct Flight {
    done: watch::Sender<Option<StartOutcome>>,
    cancelled: AtomicBool,
}

#[derive(Default)]
struct Table {
    running: HashMap<PluginKey, Arc<RunningPlugin>>,
    starting: HashMap<PluginKey, Arc<Flight>>,
}

pub(crate) struct RuntimeInner {
    base_dir: PathBuf,
    settings: RuntimeSettings,
    table: Mutex<Table>,
    root: CancellationToken,
}

impl RuntimeInner {
    /// Drop `plugin` from the table if it is still the registered entry.
    pub(crate) fn forget(&self, plugin: &Arc<RunningPlugin>) {
        let mut table = self.table.lock();
        let same = table
            .running
            .get(plugin.key())
            .is_some_and(|current| Arc::ptr_eq(current, plugin));
        if same {
            table.running.remove(plugin.key());
        }
    }
}

/// Clears the in-flight entry for a launch, publishing its outcome.
struct FlightGuard<'a> {
    inner: &'a RuntimeInner,
    key: &'a PluginKey,
    flight: &'a Arc<Flight>,
}

impl FlightGuard<'_> {
    /// The entry is cleared before the outcome is published, so a start
    /// woken by it never finds the finished flight again.
    fn finish(self, outcome: &StartOutcome) {
        self.clear();
        self.flight.done.send_replace(Some(outcome.clone()));
    }

    fn clear(&self) {
        let mut table = self.inner.table.lock();
        let same = table
            .starting
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, self.flight));
        if same {
            table.starting.remove(self.key);
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.clear();
    }
}

enum Role {
    Leader(Arc<Flight>),
    Follower(watch::Receiver<Option<StartOutcome>>),
}

/// Spawns, tracks and stops plugin processes.
#[derive(Clone)]
pub struct PluginRuntime {
    inner: Arc<RuntimeInner>,
}

impl PluginRuntime {
    /// Plugins are resolved as `<base_dir>/<category>/<plugin_id>`.
    pub fn new(base_dir: impl Into<PathBuf>, settings: RuntimeSettings) -> Self {
        Self {
            inner: Arc::new(RuntimeInner {
                base_dir: base_dir.into(),
                settings,
                table: Mutex::new(Table::default()),
                root: CancellationToken::new(),
            }),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.inner.base_dir
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.inner.settings
    }

    /// Start the plugin unless it is already running, returning its manifest.
    ///
    /// Concurrent calls for the same key spawn exactly one process and all
    /// observe the same outcome.
    pub async fn start(
        &self,
        category: &str,
        plugin_id: &str,
        instance_id: &str,
        config_json: &str,
    ) -> Result<Manifest, HangarError> {
        let (category, plugin_id, instance_id) = (category.trim(), plugin_id.trim(), instance_id.trim());
        if category.is_empty() || plugin_id.is_empty() || instance_id.is_empty() {
            return Err(HangarError::InvalidInput(
                "category, plugin_id and instance_id are required".to_string(),
            ));
        }
        if self.inner.root.is_cancelled() {
            return Err(HangarError::Process("runtime is shutting down".to_string()));
        }
        let key = PluginKey::new(category, plugin_id);

        // A flight cancelled by `stop` belongs to the previous lifecycle.
        // Wait for it to discard its process, then take a fresh look.
        let role = loop {
            let mut doomed = {
                let mut table = self.inner.table.lock();
                if let Some(running) = table.running.get(&key) {
                    return Ok(running.manifest().clone());
                }
                match table.starting.get(&key) {
                    Some(flight) if flight.cancelled.load(Ordering::Acquire) => flight.done.subscribe(),
                    Some(flight) => break Role::Follower(flight.done.subscribe()),
                    None => {
                        let (done, _) = watch::channel(None);
                        let flight = Arc::new(Flight {
                            done,
                            cancelled: AtomicBool::new(false),
                        });
                        table.starting.insert(key.clone(), flight.clone());
                        break Role::Leader(flight);
                    }
                }
            };
            tracing::debug!(plugin = %key, "waiting for a stopped start to wind down");
            let _ = doomed.wait_for(Option::is_some).await;
            if self.inner.root.is_cancelled() {
                return Err(HangarError::Process("runtime is shutting down".to_string()));
            }
        };

        match role {
            Role::Follower(mut rx) => {
                tracing::debug!(plugin = %key, "joining in-flight start");
                match rx.wait_for(Option::is_some).await {
                    Ok(outcome) => outcome.clone().unwrap_or_else(|| {
                        Err(HangarError::Internal("start finished without an outcome".to_string()))
                    }),
                    Err(_) => Err(HangarError::Process(format!("start of {key} was abandoned"))),
                }
            }
            Role::Leader(flight) => {
                let guard = FlightGuard {
                    inner: &self.inner,
                    key: &key,
                    flight: &flight,
                };
                let launched = self.launch(&key, instance_id, config_json).await;
                let outcome = self.register(&key, &flight, launched).await;
                guard.finish(&outcome);
                outcome
            }
        }
    }

    async fn register(
        &self,
        key: &PluginKey,
        flight: &Flight,
        launched: Result<RunningPlugin, HangarError>,
    ) -> StartOutcome {
        let plugin = Arc::new(launched?);
        let settings = &self.inner.settings;
        let accepted = {
            let mut table = self.inner.table.lock();
            if flight.cancelled.load(Ordering::Acquire) || self.inner.root.is_cancelled() {
                false
            } else {
                let timing = HeartbeatTiming {
                    interval: settings.heartbeat_interval,
                    timeout: settings.health_timeout,
                    grace: settings.stop_grace,
                };
                let handle = heartbeat::spawn(Arc::downgrade(&self.inner), plugin.clone(), timing);
                plugin.set_heartbeat(handle);
                table.running.insert(key.clone(), plugin.clone());
                true
            }
        };

        if !accepted {
            tracing::info!(plugin = %key, "stop requested during start, discarding process");
            plugin.shutdown(settings.stop_grace).await;
            return Err(HangarError::Process(format!("{key} was stopped while starting")));
        }

        tracing::info!(
            plugin = %key,
            instance_id = plugin.instance_id(),
            version = %plugin.manifest().version,
            pid = ?plugin.pid(),
            "plugin started"
        );
        Ok(plugin.manifest().clone())
    }

    async fn launch(
        &self,
        key: &PluginKey,
        instance_id: &str,
        config_json: &str,
    ) -> Result<RunningPlugin, HangarError> {
        let plugin_dir = self.inner.base_dir.join(&key.category).join(&key.plugin_id);
        let disk = hangar_verify::read_manifest(&plugin_dir)?;
        let entry = hangar_verify::resolve_entry(&plugin_dir, &disk)?;
        let entry_path = entry
            .entry_path
            .ok_or_else(|| HangarError::Internal(format!("{key}: entry resolved without a path")))?;

        let Spawned {
            process,
            stdin,
            mut stdout,
        } = process::spawn(&entry_path, &plugin_dir, &key.to_string())?;

        let settings = &self.inner.settings;
        let handshake = match read_handshake(&mut stdout, settings.handshake_timeout).await {
            Ok(hs) => hs,
            Err(e) => {
                process.terminate(settings.stop_grace).await;
                return Err(e);
            }
        };

        let connection = Arc::new(RpcConnection::new(key.to_string(), handshake.services, stdin, stdout));
        match self.negotiate(key, &connection, instance_id, config_json).await {
            Ok((manifest, clients)) => Ok(RunningPlugin::new(
                key.clone(),
                instance_id.to_string(),
                manifest,
                clients,
                connection,
                process,
                self.inner.root.child_token(),
            )),
            Err(e) => {
                tracing::warn!(plugin = %key, error = %e, "plugin failed to start");
                process.terminate(settings.stop_grace).await;
                Err(e)
            }
        }
    }

    /// Manifest, optional capability clients, then init.
    async fn negotiate(
        &self,
        key: &PluginKey,
        connection: &Arc<RpcConnection>,
        instance_id: &str,
        config_json: &str,
    ) -> Result<(Manifest, Clients), HangarError> {
        let settings = &self.inner.settings;
        connection.dispense(Service::Core)?;
        let core = CoreClient::new(connection.clone());

        let manifest = core.get_manifest(settings.manifest_timeout).await?;
        if manifest.plugin_id.trim().is_empty() {
            return Err(HangarError::Process(format!("{key}: manifest has an empty plugin_id")));
        }
        if manifest.plugin_id != key.plugin_id {
            tracing::warn!(
                plugin = %key,
                reported = %manifest.plugin_id,
                "plugin reports a different plugin_id than its directory"
            );
        }

        let wants = |service: Service| -> Result<bool, HangarError> {
            if !manifest.declares(service) {
                return Ok(false);
            }
            connection.dispense(service)?;
            Ok(true)
        };
        let clients = Clients {
            sms: wants(Service::Sms)?.then(|| SmsClient::new(connection.clone())),
            payment: wants(Service::Payment)?.then(|| PaymentClient::new(connection.clone())),
            kyc: wants(Service::Kyc)?.then(|| KycClient::new(connection.clone())),
            automation: wants(Service::Automation)?.then(|| AutomationClient::new(connection.clone())),
            core,
        };

        let init = clients
            .core
            .init(instance_id, config_json, settings.init_timeout)
            .await?;
        if !init.ok {
            let reason = init.error.trim();
            return Err(HangarError::InitRejected(if reason.is_empty() {
                "plugin init failed".to_string()
            } else {
                reason.to_string()
            }));
        }
        Ok((manifest, clients))
    }

    /// Stop the plugin if it is running or starting. Safe to call repeatedly.
    pub async fn stop(&self, category: &str, plugin_id: &str) {
        let key = PluginKey::new(category.trim(), plugin_id.trim());
        let removed = {
            let mut table = self.inner.table.lock();
            if let Some(flight) = table.starting.get(&key) {
                flight.cancelled.store(true, Ordering::Release);
            }
            table.running.remove(&key)
        };
        if let Some(plugin) = removed {
            tracing::info!(plugin = %key, "stopping plugin");
            plugin.shutdown(self.inner.settings.stop_grace).await;
        }
    }

    pub fn get_running(&self, category: &str, plugin_id: &str) -> Option<Arc<RunningPlugin>> {
        let key = PluginKey::new(category.trim(), plugin_id.trim());
        self.inner.table.lock().running.get(&key).cloned()
    }

    pub fn is_running(&self, category: &str, plugin_id: &str) -> bool {
        self.get_running(category, plugin_id).is_some()
    }

    /// Latest heartbeat observations, `None` when not running.
    pub fn health(&self, category: &str, plugin_id: &str) -> Option<HealthSnapshot> {
        self.get_running(category, plugin_id).map(|p| p.health())
    }

    /// Running plugins ordered by key.
    pub fn list_running(&self) -> Vec<Arc<RunningPlugin>> {
        let mut plugins: Vec<_> = self.inner.table.lock().running.values().cloned().collect();
        plugins.sort_by(|a, b| a.key().cmp(b.key()));
        plugins
    }

    /// Stop every plugin and refuse further starts.
    pub async fn shutdown(&self) {
        self.inner.root.cancel();
        let drained: Vec<Arc<RunningPlugin>> = {
            let mut table = self.inner.table.lock();
            for flight in table.starting.values() {
                flight.cancelled.store(true, Ordering::Release);
            }
            table.running.drain().map(|(_, p)| p).collect()
        };
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "stopping all plugins");
        }
        let grace = self.inner.settings.stop_grace;
        futures::future::join_all(drained.iter().map(|p| p.shutdown(grace))).await;
    }
}

impl std::fmt::Debug for PluginRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRuntime")
            .field("base_dir", &self.inner.base_dir)
            .field("running", &self.inner.table.lock().running.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let cfg = RuntimeConfig::default();
        let settings = RuntimeSettings::from(&cfg);
        assert_eq!(settings.manifest_timeout, Duration::from_secs(5));
        assert_eq!(settings.init_timeout, Duration::from_secs(10));
        assert_eq!(settings.health_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn start_rejects_blank_identity() {
        let runtime = PluginRuntime::new("/nonexistent", RuntimeSettings::default());
        let err = runtime.start("sms", "  ", "inst", "{}").await.unwrap_err();
        assert!(matches!(err, HangarError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn start_of_missing_plugin_leaves_no_trace() {
        let dir = std::env::temp_dir().join("hangar-runtime-missing");
        let runtime = PluginRuntime::new(&dir, RuntimeSettings::default());
        let err = runtime.start("sms", "ghost", "sms-ghost-1", "{}").await.unwrap_err();
        assert!(matches!(err, HangarError::Config(_)), "{err:?}");
        assert!(runtime.list_running().is_empty());
        assert!(runtime.inner.table.lock().starting.is_empty());
    }

    #[tokio::test]
    async fn stop_unknown_is_noop() {
        let runtime = PluginRuntime::new("/nonexistent", RuntimeSettings::default());
        runtime.stop("sms", "nobody").await;
        runtime.stop("sms", "nobody").await;
        assert!(!runtime.is_running("sms", "nobody"));
    }

    #[tokio::test]
    async fn shutdown_refuses_new_starts() {
        let runtime = PluginRuntime::new("/nonexistent", RuntimeSettings::default());
        runtime.shutdown().await;
        let err = runtime.start("sms", "demo", "i", "{}").await.unwrap_err();
        assert!(matches!(err, HangarError::Process(_)));
    }
}
