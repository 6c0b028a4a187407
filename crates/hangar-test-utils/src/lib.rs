// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hangar integration tests.
//!
//! Provides in-memory stores, on-disk plugin fixtures and the
//! `hangar-mock-plugin` executable for fast, deterministic tests without real
//! provider plugins.
//!
//! # Components
//!
//! - [`MemoryInstallationStore`] / [`MemorySettingsStore`] - store traits backed by memory
//! - [`PluginTree`] / [`PluginFixture`] - temporary plugin directories
//! - [`MockBehavior`] - the script the mock plugin follows

pub mod fixture;
pub mod mock;
pub mod stores;

pub use fixture::{PluginFixture, PluginTree};
pub use mock::{MockBehavior, spawn_count};
pub use stores::{MemoryInstallationStore, MemorySettingsStore};
