// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-plugin health loop.
//!
//! Each running plugin gets one task that calls `core.Health` on a fixed
//! interval. Failures are logged and counted but never stop the plugin.
//! When the plugin's stdout closes the task removes the plugin from the
//! runtime table and reaps the child.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::manager::RuntimeInner;
use crate::plugin::RunningPlugin;

#[derive(Debug, Clone, Copy)]
pub(crate) struct HeartbeatTiming {
    pub interval: Duration,
    pub timeout: Duration,
    pub grace: Duration,
}

pub(crate) fn spawn(runtime: Weak<RuntimeInner>, plugin: Arc<RunningPlugin>, timing: HeartbeatTiming) -> JoinHandle<()> {
    tokio::spawn(run(runtime, plugin, timing))
}

async fn run(runtime: Weak<RuntimeInner>, plugin: Arc<RunningPlugin>, timing: HeartbeatTiming) {
    let token = plugin.heartbeat_token().clone();
    let closed = plugin.connection().closed_token();
    let mut ticker = tokio::time::interval_at(Instant::now() + timing.interval, timing.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = closed.cancelled() => {
                tracing::warn!(plugin = %plugin.key(), "plugin process exited unexpectedly");
                if let Some(inner) = runtime.upgrade() {
                    inner.forget(&plugin);
                }
                plugin.reap(timing.grace).await;
                break;
            }
            _ = ticker.tick() => {
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    r = plugin.core().health(plugin.instance_id(), timing.timeout) => r,
                };
                match result {
                    Ok(resp) => {
                        tracing::trace!(plugin = %plugin.key(), status = ?resp.status, "heartbeat");
                        plugin.record_health(resp);
                    }
                    Err(e) => {
                        plugin.record_failure();
                        tracing::warn!(plugin = %plugin.key(), error = %e, "plugin health check failed");
                    }
                }
            }
        }
    }
    tracing::debug!(plugin = %plugin.key(), "heartbeat stopped");
}
