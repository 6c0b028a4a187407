// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installed-plugin management for the Hangar host.
//!
//! Plugins live on disk as `<base_dir>/<category>/<plugin_id>/`. The
//! [`scanner`] finds them, [`discovery`] reconciles them with the installation
//! store, and [`PluginManager`] drives enablement, configuration and process
//! start/stop on top of the runtime.

pub mod discovery;
pub mod manager;
pub mod scanner;

pub use discovery::{
    BOOTSTRAPPED_SETTING, BootstrapReport, DiscoverItem, Discovery, new_instance_id, parse_bool_setting,
};
pub use manager::{InstalledPlugin, PluginManager};
pub use scanner::{DiscoveredPlugin, scan_disk_plugins};
