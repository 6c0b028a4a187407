// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store traits. Implemented by `hangar-storage` and the in-memory test doubles.

pub mod store;

pub use store::{InstallationStore, SettingsStore};
