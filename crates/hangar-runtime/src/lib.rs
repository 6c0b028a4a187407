// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin process runtime.
//!
//! [`PluginRuntime`] owns the table of live plugin processes. Starting a
//! plugin resolves its entry executable from disk, spawns it with the
//! handshake environment, negotiates services over stdio, fetches the
//! manifest, runs `core.Init`, and keeps a heartbeat running until the
//! plugin is stopped or exits.

pub mod clients;
pub mod connection;
mod handshake;
mod heartbeat;
pub mod manager;
pub mod plugin;
mod process;

pub use clients::{AutomationClient, CoreClient, KycClient, PaymentClient, SmsClient};
pub use connection::RpcConnection;
pub use manager::{PluginRuntime, RuntimeSettings};
pub use plugin::{HealthSnapshot, PluginKey, RunningPlugin};
