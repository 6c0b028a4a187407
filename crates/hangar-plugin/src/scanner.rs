// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Walks `<base_dir>/<category>/<plugin_id>/` looking for plugin directories.
//!
//! A candidate counts only when its `manifest.json` parses and declares the
//! same `plugin_id` as its directory name. Everything else is skipped, never
//! reported as an error, so one broken plugin cannot hide the others.

use std::fs;
use std::path::{Path, PathBuf};

use hangar_core::HangarError;
use hangar_verify::{DiskManifest, read_manifest};

/// A plugin directory with a valid manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPlugin {
    pub category: String,
    pub plugin_id: String,
    pub dir: PathBuf,
    pub manifest: DiskManifest,
}

impl DiscoveredPlugin {
    pub fn key(&self) -> String {
        format!("{}:{}", self.category, self.plugin_id)
    }
}

/// Scan the plugin tree. Results are sorted by `(category, plugin_id)`.
///
/// A missing `base_dir` yields an empty list. A `base_dir` that exists but is
/// not a directory is an error.
pub fn scan_disk_plugins(base_dir: &Path) -> Result<Vec<DiscoveredPlugin>, HangarError> {
    if base_dir.as_os_str().is_empty() {
        return Err(HangarError::InvalidInput(
            "plugin base directory is empty".to_string(),
        ));
    }
    let meta = match fs::metadata(base_dir) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(base_dir = %base_dir.display(), "plugin base directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(HangarError::Config(format!(
                "failed to stat {}: {e}",
                base_dir.display()
            )));
        }
    };
    if !meta.is_dir() {
        return Err(HangarError::Config(format!(
            "plugin base {} is not a directory",
            base_dir.display()
        )));
    }

    let mut found = Vec::new();
    for (category, category_dir) in visible_subdirs(base_dir)? {
        let plugins = match visible_subdirs(&category_dir) {
            Ok(plugins) => plugins,
            Err(e) => {
                tracing::debug!(category = %category, error = %e, "skipping unreadable category");
                continue;
            }
        };
        for (plugin_id, dir) in plugins {
            let manifest = match read_manifest(&dir) {
                Ok(manifest) => manifest,
                Err(e) => {
                    tracing::debug!(
                        category = %category,
                        plugin_id = %plugin_id,
                        error = %e,
                        "skipping plugin directory without a usable manifest"
                    );
                    continue;
                }
            };
            if manifest.plugin_id != plugin_id {
                tracing::debug!(
                    category = %category,
                    plugin_id = %plugin_id,
                    declared = %manifest.plugin_id,
                    "skipping plugin directory whose manifest declares another id"
                );
                continue;
            }
            found.push(DiscoveredPlugin {
                category: category.clone(),
                plugin_id,
                dir,
                manifest,
            });
        }
    }
    found.sort_by(|a, b| {
        (a.category.as_str(), a.plugin_id.as_str()).cmp(&(b.category.as_str(), b.plugin_id.as_str()))
    });
    Ok(found)
}

/// Child directories whose names are non-empty and not hidden.
fn visible_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>, HangarError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| HangarError::Config(format!("failed to read {}: {e}", dir.display())))?;
    let mut out = Vec::new();
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        let name = entry.file_name().to_string_lossy().trim().to_string();
        if name.is_empty() || name.starts_with('.') {
            continue;
        }
        out.push((name, entry.path()));
    }
    Ok(out)
}
