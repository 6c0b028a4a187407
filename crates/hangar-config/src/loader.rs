// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./hangar.toml` > `~/.config/hangar/hangar.toml` > `/etc/hangar/hangar.toml`,
//! with `HANGAR_` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HangarConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hangar/hangar.toml`
/// 3. `~/.config/hangar/hangar.toml`
/// 4. `./hangar.toml`
/// 5. `HANGAR_*` environment variables
pub fn load_config() -> Result<HangarConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. Used by tests.
pub fn load_config_from_str(toml_content: &str) -> Result<HangarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HangarConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HangarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HangarConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HangarConfig::default()))
        .merge(Toml::file("/etc/hangar/hangar.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("hangar/hangar.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("hangar.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `HANGAR_RUNTIME_INIT_TIMEOUT_SECS` must map to
/// `runtime.init_timeout_secs`, not `runtime.init.timeout.secs`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("HANGAR_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 6] = ["plugins", "runtime", "adapters", "storage", "vault", "logging"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
