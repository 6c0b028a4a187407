// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hangar plugin host.
//!
//! This crate provides the error taxonomy, the persisted domain types, and the
//! store traits consumed by discovery and the plugin manager.

pub mod error;
pub mod traits;
pub mod types;

pub use error::HangarError;
pub use traits::{InstallationStore, SettingsStore};
pub use types::{PluginInstallation, Setting, SignatureStatus, category};
