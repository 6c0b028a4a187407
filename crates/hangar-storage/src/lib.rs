// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for plugin installations and settings.

pub mod database;
mod installations;
pub mod migrations;
mod settings;

pub use database::Database;
pub use installations::SqliteStore;
