// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hangar serve` command implementation.
//!
//! Bootstraps installations from the plugin tree, starts every enabled
//! plugin, and keeps the processes alive until SIGINT or SIGTERM. On the way
//! out every plugin process is stopped and reaped.

use std::time::Duration;

use hangar_adapters::{Adapters, PaymentProvider};
use hangar_config::HangarConfig;
use hangar_core::HangarError;
use hangar_plugin::PluginManager;
use tracing::{info, warn};

use crate::commands::build_manager;
use crate::shutdown;

/// How often the serve loop logs a summary of running plugins.
const STATUS_INTERVAL: Duration = Duration::from_secs(300);

pub async fn run_serve(config: HangarConfig) -> Result<(), HangarError> {
    info!(base_dir = %config.plugins.base_dir, "starting hangar serve");

    let manager = build_manager(&config).await?;
    let report = manager.bootstrap_from_disk().await?;
    info!(
        first_run = report.first_run,
        imported = report.imported.len(),
        "bootstrap finished"
    );
    for key in &report.imported {
        info!(plugin = %key, "imported from disk");
    }

    let started = manager.start_enabled().await?;
    info!(started, "enabled plugins started");
    log_payment_providers(&manager, &config).await;

    let cancel = shutdown::install_signal_handler();
    let mut status = tokio::time::interval(STATUS_INTERVAL);
    status.tick().await;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = status.tick() => log_status(&manager),
        }
    }

    info!("shutting down plugins");
    manager.runtime().shutdown().await;
    info!("hangar serve stopped");
    Ok(())
}

async fn log_payment_providers(manager: &PluginManager, config: &HangarConfig) {
    let adapters = Adapters::new(manager.runtime().clone())
        .with_call_timeout(config.adapters.call_timeout())
        .with_payment_timeout(config.adapters.payment_timeout());
    let registry = adapters.payment_registry(manager.discovery().installations().clone());
    match registry.list_providers().await {
        Ok(providers) if providers.is_empty() => {}
        Ok(providers) => {
            let keys: Vec<String> = providers.iter().map(|p| p.key()).collect();
            info!(providers = ?keys, "payment providers available");
        }
        Err(e) => warn!(error = %e, "cannot list payment providers"),
    }
}

fn log_status(manager: &PluginManager) {
    let running = manager.runtime().list_running();
    for plugin in &running {
        let health = plugin.health();
        info!(
            plugin = %plugin.key(),
            pid = ?plugin.pid(),
            beats = health.beats,
            failures = health.failures,
            "plugin status"
        );
    }
    if running.is_empty() {
        info!("no plugins running");
    }
}
