// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `manifest.json` parsing and platform entry-point resolution.
//!
//! A manifest declares the plugin identity, its capabilities, and one
//! executable per supported platform:
//!
//! ```json
//! {
//!   "plugin_id": "ezpay",
//!   "name": "EZPay",
//!   "version": "1.0.0",
//!   "binaries": { "linux_x86_64": "bin/ezpay" },
//!   "capabilities": { "payment": { "methods": ["alipay", "wxpay"] } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use hangar_core::HangarError;
use hangar_protocol::lifecycle::{
    AutomationCapability, KycCapability, PaymentCapability, SmsCapability, capability,
};
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Capability blocks declared on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub sms: Option<SmsCapability>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub payment: Option<PaymentCapability>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub kyc: Option<KycCapability>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub automation: Option<AutomationCapability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskManifest {
    pub plugin_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Platform key (`linux_x86_64`) to path relative to the plugin directory.
    #[serde(default)]
    pub binaries: BTreeMap<String, String>,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// Parses a manifest from its JSON text.
pub fn parse_manifest(json: &str) -> Result<DiskManifest, HangarError> {
    let mut manifest: DiskManifest = serde_json::from_str(json)
        .map_err(|e| HangarError::Config(format!("failed to parse {MANIFEST_FILE}: {e}")))?;
    manifest.plugin_id = manifest.plugin_id.trim().to_string();
    if manifest.plugin_id.is_empty() {
        return Err(HangarError::Config(
            "manifest plugin_id must not be empty".to_string(),
        ));
    }
    Ok(manifest)
}

/// Reads and parses `<plugin_dir>/manifest.json`.
pub fn read_manifest(plugin_dir: &Path) -> Result<DiskManifest, HangarError> {
    let path = plugin_dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        HangarError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    parse_manifest(&content)
}

/// The platform key of the running host, e.g. `linux_x86_64`.
pub fn current_platform() -> String {
    format!("{}_{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Lowercases and maps Go-style names (`darwin`, `amd64`, `arm64`) to Rust target names.
pub fn normalize_platform(platform: &str) -> String {
    let lower = platform.trim().to_ascii_lowercase();
    let Some((os, arch)) = lower.split_once('_') else {
        return lower;
    };
    let os = match os {
        "darwin" | "osx" => "macos",
        other => other,
    };
    let arch = match arch {
        "amd64" | "x64" => "x86_64",
        "arm64" => "aarch64",
        "386" | "i386" | "i686" => "x86",
        other => other,
    };
    format!("{os}_{arch}")
}

/// Where a plugin's executable lives for this host, plus what it supports.
///
/// Produced even when resolution fails so operators can see the declared platforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub platform: String,
    /// Declared platform keys, sorted.
    pub supported_platforms: Vec<String>,
    /// Declared relative path for this platform, if any.
    pub entry_rel: Option<String>,
    /// Absolute path, set only after successful resolution.
    pub entry_path: Option<PathBuf>,
}

/// Describes the entry point without touching the filesystem.
pub fn describe_entry(manifest: &DiskManifest) -> EntryInfo {
    let platform = current_platform();
    let entry_rel = manifest
        .binaries
        .iter()
        .find(|(key, _)| normalize_platform(key) == platform)
        .map(|(_, rel)| rel.trim().to_string());
    EntryInfo {
        platform,
        supported_platforms: manifest.binaries.keys().cloned().collect(),
        entry_rel,
        entry_path: None,
    }
}

/// Resolves the executable for the current OS/architecture.
///
/// Fails with [`HangarError::PlatformUnsupported`] listing the declared
/// platforms when none matches, and with `Config` when the declared path is
/// unsafe or missing.
pub fn resolve_entry(plugin_dir: &Path, manifest: &DiskManifest) -> Result<EntryInfo, HangarError> {
    let mut info = describe_entry(manifest);
    if manifest.binaries.is_empty() {
        return Err(HangarError::Config(format!(
            "plugin {} declares no binaries",
            manifest.plugin_id
        )));
    }
    let Some(rel) = info.entry_rel.clone() else {
        return Err(HangarError::PlatformUnsupported {
            platform: info.platform,
            supported: info.supported_platforms,
        });
    };
    validate_relative_path(&rel)?;
    let path = plugin_dir.join(&rel);
    if !path.is_file() {
        return Err(HangarError::Config(format!(
            "entry {rel} for {} not found in {}",
            info.platform,
            plugin_dir.display()
        )));
    }
    info.entry_path = Some(path);
    Ok(info)
}

/// Rejects absolute paths and anything that climbs out of the plugin directory.
fn validate_relative_path(rel: &str) -> Result<(), HangarError> {
    if rel.is_empty() {
        return Err(HangarError::Config("entry path is empty".to_string()));
    }
    let path = Path::new(rel);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(HangarError::Config(format!(
                    "entry path {rel} must stay inside the plugin directory"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with(binaries: &[(&str, &str)]) -> DiskManifest {
        DiskManifest {
            plugin_id: "demo".into(),
            name: "Demo".into(),
            version: "0.1.0".into(),
            description: String::new(),
            binaries: binaries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            capabilities: Capabilities::default(),
        }
    }

    #[test]
    fn parse_full_manifest() {
        let m = parse_manifest(
            r#"{
                "plugin_id": " ezpay ",
                "name": "EZPay",
                "version": "1.0.0",
                "binaries": {"linux_x86_64": "bin/ezpay"},
                "capabilities": {"payment": {"methods": ["alipay", "wxpay"]}}
            }"#,
        )
        .unwrap();
        assert_eq!(m.plugin_id, "ezpay");
        assert_eq!(
            m.capabilities.payment.unwrap().methods,
            vec!["alipay".to_string(), "wxpay".to_string()]
        );
        assert!(m.capabilities.sms.is_none());
    }

    #[test]
    fn capability_shorthand_on_disk() {
        let m = parse_manifest(r#"{"plugin_id": "alisms", "capabilities": {"sms": true, "kyc": false}}"#).unwrap();
        assert_eq!(m.capabilities.sms, Some(SmsCapability { send: true }));
        assert!(m.capabilities.kyc.is_none());
    }

    #[test]
    fn empty_plugin_id_is_config_error() {
        let err = parse_manifest(r#"{"plugin_id": "  "}"#).unwrap_err();
        assert!(matches!(err, HangarError::Config(msg) if msg.contains("plugin_id")));
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            parse_manifest("{not json"),
            Err(HangarError::Config(_))
        ));
    }

    #[test]
    fn go_style_platforms_normalize() {
        assert_eq!(normalize_platform("linux_amd64"), "linux_x86_64");
        assert_eq!(normalize_platform("Darwin_ARM64"), "macos_aarch64");
        assert_eq!(normalize_platform("windows_x86_64"), "windows_x86_64");
    }

    #[test]
    fn unsupported_platform_lists_declared_ones() {
        let dir = tempfile::tempdir().unwrap();
        let m = manifest_with(&[("plan9_mips", "bin/a"), ("haiku_x86", "bin/b")]);
        let err = resolve_entry(dir.path(), &m).unwrap_err();
        match err {
            HangarError::PlatformUnsupported {
                platform,
                supported,
            } => {
                assert_eq!(platform, current_platform());
                assert_eq!(supported, vec!["haiku_x86".to_string(), "plan9_mips".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn resolves_existing_entry_for_this_platform() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/demo"), b"#!/bin/sh\n").unwrap();
        let platform = current_platform();
        let m = manifest_with(&[(platform.as_str(), "bin/demo")]);
        let info = resolve_entry(dir.path(), &m).unwrap();
        assert_eq!(info.entry_path, Some(dir.path().join("bin/demo")));
    }

    #[test]
    fn missing_entry_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let platform = current_platform();
        let m = manifest_with(&[(platform.as_str(), "bin/absent")]);
        assert!(matches!(
            resolve_entry(dir.path(), &m),
            Err(HangarError::Config(msg)) if msg.contains("not found")
        ));
    }

    #[test]
    fn escaping_entry_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let platform = current_platform();
        for rel in ["../outside", "/usr/bin/env", "bin/../../x"] {
            let m = manifest_with(&[(platform.as_str(), rel)]);
            assert!(
                matches!(resolve_entry(dir.path(), &m), Err(HangarError::Config(_))),
                "{rel} should be rejected"
            );
        }
    }

    #[test]
    fn describe_entry_does_not_require_match() {
        let m = manifest_with(&[("plan9_mips", "bin/a")]);
        let info = describe_entry(&m);
        assert!(info.entry_rel.is_none());
        assert_eq!(info.supported_platforms, vec!["plan9_mips".to_string()]);
    }
}
