// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hangar plugin host.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across the verifier, runtime, adapters and stores.
///
/// The type is `Clone` so a single start outcome can be handed to every caller
/// waiting on the same plugin key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HangarError {
    /// Malformed manifest, configuration JSON, or host configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// No entry point declared for the current OS/architecture.
    #[error("unsupported platform {platform}, supported: {}", supported.join(", "))]
    PlatformUnsupported {
        platform: String,
        supported: Vec<String>,
    },

    /// Signature evidence could not be produced or read.
    #[error("trust error: {0}")]
    Trust(String),

    /// Spawn, handshake or dispense failure. The process has already been killed.
    #[error("plugin process error: {0}")]
    Process(String),

    /// The plugin's own `Init` answered not-ok. Carries the plugin text verbatim.
    #[error("{0}")]
    InitRejected(String),

    /// Capability absent, or the plugin answered "unimplemented".
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A JSON-RPC error object returned by the plugin.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// A bounded call ran out of time.
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The connection to the plugin process broke.
    #[error("transport error: {0}")]
    Transport(String),

    /// No live process for the requested plugin.
    #[error("plugin not running: {0}")]
    NotRunning(String),

    /// A business-level not-ok answer. Carries the plugin text verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Installation or settings store failure.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Sealing or opening plugin configuration failed.
    #[error("vault error: {0}")]
    Vault(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HangarError {
    /// Whether callers should branch on a missing capability.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, HangarError::NotSupported(_))
    }

    /// Timeouts, broken connections and RPC-level failures. Never retried here.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            HangarError::Rpc { .. } | HangarError::Timeout { .. } | HangarError::Transport(_)
        )
    }
}
