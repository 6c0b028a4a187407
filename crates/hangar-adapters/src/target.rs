// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup of the process an adapter is bound to.

use std::sync::Arc;

use hangar_core::HangarError;
use hangar_runtime::{PluginRuntime, RunningPlugin};

/// The running plugin, provided it serves `instance_id`.
///
/// A process started for another instance counts as not running, so an
/// adapter never talks to a deployment it was not built for.
pub(crate) fn running_instance(
    runtime: &PluginRuntime,
    category: &str,
    plugin_id: &str,
    instance_id: &str,
) -> Result<Arc<RunningPlugin>, HangarError> {
    let running = runtime
        .get_running(category, plugin_id)
        .ok_or_else(|| HangarError::NotRunning(format!("{category}:{plugin_id}")))?;
    if running.instance_id() != instance_id {
        return Err(HangarError::NotRunning(format!(
            "instance {instance_id} of {} is not running",
            running.key()
        )));
    }
    Ok(running)
}
