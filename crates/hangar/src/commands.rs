// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot management subcommands.

use std::path::Path;
use std::sync::Arc;

use hangar_config::HangarConfig;
use hangar_core::HangarError;
use hangar_plugin::{Discovery, PluginManager};
use hangar_runtime::{PluginRuntime, RuntimeSettings};
use hangar_storage::{Database, SqliteStore};
use hangar_vault::ConfigSealer;
use hangar_verify::{SigningKeypair, decode_trusted_keys, read_manifest, resolve_entry, sign_plugin_dir, verify_signature};

/// Wire storage, trust keys, the sealer and a runtime into a manager.
pub async fn build_manager(config: &HangarConfig) -> Result<PluginManager, HangarError> {
    let trusted = decode_trusted_keys(&config.plugins.official_keys)?;
    let sealer = ConfigSealer::from_hex(&config.vault.master_key)?;
    if !sealer.is_enabled() {
        tracing::warn!("vault.master_key is empty, plugin configuration cannot be set");
    }
    let store = Arc::new(SqliteStore::new(Database::open_with(&config.storage).await?));
    let discovery = Discovery::new(&config.plugins.base_dir, trusted, store.clone(), store);
    let runtime = Arc::new(PluginRuntime::new(
        &config.plugins.base_dir,
        RuntimeSettings::from(&config.runtime),
    ));
    Ok(PluginManager::new(discovery, runtime, sealer))
}

pub async fn discover(config: &HangarConfig) -> Result<(), HangarError> {
    let manager = build_manager(config).await?;
    let items = manager.discover_on_disk().await?;
    let json = serde_json::to_string_pretty(&items)
        .map_err(|e| HangarError::Internal(format!("encoding discover output: {e}")))?;
    println!("{json}");
    Ok(())
}

pub async fn import(config: &HangarConfig, category: &str, plugin_id: &str) -> Result<(), HangarError> {
    let manager = build_manager(config).await?;
    let installation = manager.import_from_disk(category, plugin_id).await?;
    println!(
        "imported {} ({}, instance {})",
        installation.key(),
        installation.signature_status,
        installation.instance_id
    );
    Ok(())
}

pub async fn list(config: &HangarConfig) -> Result<(), HangarError> {
    let manager = build_manager(config).await?;
    let plugins = manager.list().await?;
    if plugins.is_empty() {
        println!("no plugins installed");
        return Ok(());
    }
    for plugin in plugins {
        let inst = &plugin.installation;
        println!(
            "{:<28} {:<10} {:<9} {:<10} {}",
            inst.key(),
            plugin.version(),
            if inst.enabled { "enabled" } else { "disabled" },
            inst.signature_status,
            plugin.name(),
        );
    }
    Ok(())
}

pub async fn set_enabled(
    config: &HangarConfig,
    category: &str,
    plugin_id: &str,
    enabled: bool,
) -> Result<(), HangarError> {
    let manager = build_manager(config).await?;
    let installation = manager.set_enabled(category, plugin_id, enabled).await?;
    println!(
        "{} {}",
        installation.key(),
        if installation.enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub fn keygen() -> Result<(), HangarError> {
    let keypair = SigningKeypair::generate();
    println!("private: {}", keypair.private_base64());
    println!("public:  {}", keypair.public_base64());
    Ok(())
}

pub fn sign(dir: &Path, private_key: &str) -> Result<(), HangarError> {
    let keypair = SigningKeypair::from_base64(private_key)?;
    read_manifest(dir)?;
    let checksums = sign_plugin_dir(dir, keypair.signing_key())?;
    println!("signed {} ({} files)", dir.display(), checksums.files.len());
    Ok(())
}

pub fn verify(config: &HangarConfig, dir: &Path) -> Result<(), HangarError> {
    let trusted = decode_trusted_keys(&config.plugins.official_keys)?;
    let manifest = read_manifest(dir)?;
    let status = verify_signature(dir, &trusted)?;
    println!("{} {}: {status}", manifest.plugin_id, manifest.version);
    match resolve_entry(dir, &manifest) {
        Ok(entry) => println!("entry for {}: {}", entry.platform, entry.entry_rel.unwrap_or_default()),
        Err(e) => println!("entry: {e}"),
    }
    Ok(())
}
