// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spawning and killing plugin executables.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use hangar_core::HangarError;
use hangar_protocol::handshake::{MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE, PROTOCOL_VERSION, PROTOCOL_VERSION_ENV};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// A live child process. Dropping it kills the child.
pub(crate) struct PluginProcess {
    child: Mutex<Child>,
    pid: Option<u32>,
}

pub(crate) struct Spawned {
    pub process: PluginProcess,
    pub stdin: ChildStdin,
    pub stdout: BufReader<ChildStdout>,
}

/// Spawn `entry` rooted at `plugin_dir` with the handshake environment.
///
/// Stderr is forwarded line by line to `tracing` under the plugin label.
pub(crate) fn spawn(entry: &Path, plugin_dir: &Path, label: &str) -> Result<Spawned, HangarError> {
    let mut cmd = Command::new(entry);
    cmd.current_dir(plugin_dir)
        .env(MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE)
        .env(PROTOCOL_VERSION_ENV, PROTOCOL_VERSION.to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| HangarError::Process(format!("failed to spawn {}: {e}", entry.display())))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| HangarError::Process("child has no stdin".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| HangarError::Process("child has no stdout".to_string()))?;

    if let Some(stderr) = child.stderr.take() {
        let label = label.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "hangar::plugin_stderr", plugin = %label, "{line}");
            }
        });
    }

    let pid = child.id();
    tracing::info!(plugin = %label, pid = ?pid, entry = %entry.display(), "spawned plugin process");

    Ok(Spawned {
        process: PluginProcess {
            child: Mutex::new(child),
            pid,
        },
        stdin,
        stdout: BufReader::new(stdout),
    })
}

impl PluginProcess {
    pub(crate) fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Kill the child and wait up to `grace` for it to be reaped.
    pub(crate) async fn terminate(&self, grace: Duration) {
        let mut child = self.child.lock().await;
        if let Ok(Some(status)) = child.try_wait() {
            tracing::debug!(pid = ?self.pid, %status, "plugin process already exited");
            return;
        }
        if let Err(e) = child.start_kill() {
            tracing::debug!(pid = ?self.pid, error = %e, "kill failed");
        }
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(pid = ?self.pid, %status, "plugin process reaped"),
            Ok(Err(e)) => tracing::warn!(pid = ?self.pid, error = %e, "waiting for plugin process failed"),
            Err(_) => tracing::warn!(pid = ?self.pid, ?grace, "plugin process not reaped in time"),
        }
    }
}
