// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hangar_core::HangarError;
use hangar_protocol::lifecycle::{HealthCheckResponse, Manifest};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clients::{AutomationClient, CoreClient, KycClient, PaymentClient, SmsClient};
use crate::connection::RpcConnection;
use crate::process::PluginProcess;

/// Runtime table key: one live process per `(category, plugin_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey {
    pub category: String,
    pub plugin_id: String,
}

impl PluginKey {
    pub fn new(category: impl Into<String>, plugin_id: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            plugin_id: plugin_id.into(),
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.plugin_id)
    }
}

/// Latest heartbeat observations for a running plugin.
#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    pub last_health_at: Option<DateTime<Utc>>,
    pub last_health: Option<HealthCheckResponse>,
    pub beats: u64,
    pub failures: u64,
}

pub(crate) struct Clients {
    pub core: CoreClient,
    pub sms: Option<SmsClient>,
    pub payment: Option<PaymentClient>,
    pub kyc: Option<KycClient>,
    pub automation: Option<AutomationClient>,
}

/// A plugin process that completed handshake, manifest and init.
pub struct RunningPlugin {
    key: PluginKey,
    instance_id: String,
    manifest: Manifest,
    started_at: DateTime<Utc>,
    clients: Clients,
    connection: Arc<RpcConnection>,
    process: PluginProcess,
    health: Mutex<HealthSnapshot>,
    heartbeat_cancel: CancellationToken,
    heartbeat_task: Mutex<Option<JoinHandle<()>>>,
}

impl RunningPlugin {
    pub(crate) fn new(
        key: PluginKey,
        instance_id: String,
        manifest: Manifest,
        clients: Clients,
        connection: Arc<RpcConnection>,
        process: PluginProcess,
        heartbeat_cancel: CancellationToken,
    ) -> Self {
        Self {
            key,
            instance_id,
            manifest,
            started_at: Utc::now(),
            clients,
            connection,
            process,
            health: Mutex::new(HealthSnapshot::default()),
            heartbeat_cancel,
            heartbeat_task: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &PluginKey {
        &self.key
    }

    pub fn category(&self) -> &str {
        &self.key.category
    }

    pub fn plugin_id(&self) -> &str {
        &self.key.plugin_id
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    pub fn is_alive(&self) -> bool {
        !self.connection.is_closed()
    }

    pub fn core(&self) -> &CoreClient {
        &self.clients.core
    }

    pub fn sms(&self) -> Result<SmsClient, HangarError> {
        self.clients.sms.clone().ok_or_else(|| self.missing("sms"))
    }

    pub fn payment(&self) -> Result<PaymentClient, HangarError> {
        self.clients.payment.clone().ok_or_else(|| self.missing("payment"))
    }

    pub fn kyc(&self) -> Result<KycClient, HangarError> {
        self.clients.kyc.clone().ok_or_else(|| self.missing("kyc"))
    }

    pub fn automation(&self) -> Result<AutomationClient, HangarError> {
        self.clients
            .automation
            .clone()
            .ok_or_else(|| self.missing("automation"))
    }

    fn missing(&self, capability: &str) -> HangarError {
        HangarError::NotSupported(format!("{} does not provide {capability}", self.key))
    }

    pub fn health(&self) -> HealthSnapshot {
        self.health.lock().clone()
    }

    pub(crate) fn connection(&self) -> &Arc<RpcConnection> {
        &self.connection
    }

    pub(crate) fn heartbeat_token(&self) -> &CancellationToken {
        &self.heartbeat_cancel
    }

    pub(crate) fn set_heartbeat(&self, handle: JoinHandle<()>) {
        *self.heartbeat_task.lock() = Some(handle);
    }

    pub(crate) fn record_health(&self, resp: HealthCheckResponse) {
        let mut health = self.health.lock();
        health.last_health_at = Some(Utc::now());
        health.last_health = Some(resp);
        health.beats += 1;
    }

    pub(crate) fn record_failure(&self) {
        self.health.lock().failures += 1;
    }

    /// Reap the process without touching the heartbeat. Used by the heartbeat itself.
    pub(crate) async fn reap(&self, grace: Duration) {
        self.process.terminate(grace).await;
    }

    /// Stop the heartbeat, wait for it to finish, then kill the process.
    pub(crate) async fn shutdown(&self, grace: Duration) {
        self.heartbeat_cancel.cancel();
        let handle = self.heartbeat_task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::debug!(plugin = %self.key, error = %e, "heartbeat task ended abnormally");
            }
        }
        self.process.terminate(grace).await;
    }
}

impl fmt::Debug for RunningPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningPlugin")
            .field("key", &self.key)
            .field("instance_id", &self.instance_id)
            .field("pid", &self.process.pid())
            .field("alive", &self.is_alive())
            .finish()
    }
}
