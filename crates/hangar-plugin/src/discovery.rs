// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciles the plugin tree on disk with the installation store.
//!
//! The first bootstrap adopts everything found on disk. Afterwards only
//! officially signed newcomers are imported automatically; the rest wait in
//! [`Discovery::discover_on_disk`] for an operator to import them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ed25519_dalek::VerifyingKey;
use hangar_core::{HangarError, InstallationStore, PluginInstallation, Setting, SettingsStore, SignatureStatus};
use hangar_verify::{EntryInfo, MANIFEST_FILE, describe_entry, read_manifest, resolve_entry, verify_signature};
use serde::Serialize;
use uuid::Uuid;

use crate::scanner::{DiscoveredPlugin, scan_disk_plugins};

/// Settings key holding the one-time bootstrap flag.
pub const BOOTSTRAPPED_SETTING: &str = "plugins_bootstrapped";

/// What a bootstrap pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Whether this pass performed the first-run bulk adoption.
    pub first_run: bool,
    /// `category:plugin_id` keys imported by this pass.
    pub imported: Vec<String>,
}

/// A plugin on disk that the store does not know about yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverItem {
    pub category: String,
    pub plugin_id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub signature_status: SignatureStatus,
    /// Entry metadata, present even when no binary matches this host.
    pub entry: EntryInfo,
    /// Why the entry could not be resolved, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_error: Option<String>,
}

/// Generates the stable instance id assigned at first import.
pub fn new_instance_id(category: &str, plugin_id: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{category}-{plugin_id}-{}", &uuid[..12])
}

/// Lenient boolean parsing for settings values, which may be JSON-quoted.
///
/// Accepts `true/1/yes/y` and `false/0/no/n` in any case. Anything else is `None`.
pub fn parse_bool_setting(raw: &str) -> Option<bool> {
    let v = raw.trim().trim_matches('"').trim().to_ascii_lowercase();
    match v.as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Disk discovery and import against the installation and settings stores.
pub struct Discovery {
    base_dir: PathBuf,
    trusted_keys: Vec<VerifyingKey>,
    installations: Arc<dyn InstallationStore>,
    settings: Arc<dyn SettingsStore>,
}

impl Discovery {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        trusted_keys: Vec<VerifyingKey>,
        installations: Arc<dyn InstallationStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            trusted_keys,
            installations,
            settings,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn installations(&self) -> &Arc<dyn InstallationStore> {
        &self.installations
    }

    pub fn plugin_dir(&self, category: &str, plugin_id: &str) -> PathBuf {
        self.base_dir.join(category).join(plugin_id)
    }

    /// Import new disk plugins according to the bootstrap flag.
    ///
    /// An empty installation store always counts as a first run, whatever the
    /// flag says.
    pub async fn bootstrap_from_disk(&self) -> Result<BootstrapReport, HangarError> {
        let existing = self.installed_keys().await?;
        let mut bootstrapped = match self.settings.get_setting(BOOTSTRAPPED_SETTING).await? {
            Some(setting) => parse_bool_setting(&setting.value_json).unwrap_or(false),
            None => false,
        };
        if existing.is_empty() {
            bootstrapped = false;
        }

        let discovered = scan_disk_plugins(&self.base_dir)?;
        let mut report = BootstrapReport {
            first_run: !bootstrapped,
            imported: Vec::new(),
        };

        for plugin in discovered.iter().filter(|p| !existing.contains(&p.key())) {
            let status = self.signature_status_lenient(&plugin.dir);
            if bootstrapped && status != SignatureStatus::Official {
                tracing::info!(
                    category = %plugin.category,
                    plugin_id = %plugin.plugin_id,
                    signature_status = %status,
                    "new plugin on disk needs a manual import"
                );
                continue;
            }
            if let Err(e) = resolve_entry(&plugin.dir, &plugin.manifest) {
                tracing::debug!(
                    category = %plugin.category,
                    plugin_id = %plugin.plugin_id,
                    error = %e,
                    "imported plugin has no usable entry on this host"
                );
            }
            self.insert_new(plugin, status).await?;
            report.imported.push(plugin.key());
        }

        if !bootstrapped {
            self.settings
                .upsert_setting(&Setting::new(BOOTSTRAPPED_SETTING, "true"))
                .await?;
        }
        tracing::info!(
            first_run = report.first_run,
            imported = report.imported.len(),
            "plugin bootstrap complete"
        );
        Ok(report)
    }

    /// Plugins on disk that are not installed yet. Performs no writes.
    pub async fn discover_on_disk(&self) -> Result<Vec<DiscoverItem>, HangarError> {
        let existing = self.installed_keys().await?;
        let discovered = scan_disk_plugins(&self.base_dir)?;

        let items = discovered
            .into_iter()
            .filter(|p| !existing.contains(&p.key()))
            .map(|p| {
                let signature_status = self.signature_status_lenient(&p.dir);
                let (entry, entry_error) = match resolve_entry(&p.dir, &p.manifest) {
                    Ok(entry) => (entry, None),
                    Err(e) => (describe_entry(&p.manifest), Some(e.to_string())),
                };
                DiscoverItem {
                    category: p.category,
                    plugin_id: p.plugin_id,
                    name: p.manifest.name,
                    version: p.manifest.version,
                    description: p.manifest.description,
                    signature_status,
                    entry,
                    entry_error,
                }
            })
            .collect();
        Ok(items)
    }

    /// Import or refresh one plugin directory.
    ///
    /// An existing installation only has its signature status refreshed;
    /// `enabled` and the sealed configuration stay untouched.
    pub async fn import_from_disk(
        &self,
        category: &str,
        plugin_id: &str,
    ) -> Result<PluginInstallation, HangarError> {
        let (category, plugin_id) = (category.trim(), plugin_id.trim());
        if category.is_empty() || plugin_id.is_empty() {
            return Err(HangarError::InvalidInput("invalid plugin".to_string()));
        }
        let dir = self.plugin_dir(category, plugin_id);
        if !dir.is_dir() {
            return Err(HangarError::NotFound(format!(
                "plugin dir not found: {}",
                dir.display()
            )));
        }

        let manifest = read_manifest(&dir)?;
        if manifest.plugin_id != plugin_id {
            return Err(HangarError::Config(format!(
                "manifest plugin_id mismatch: directory {plugin_id}, manifest {}",
                manifest.plugin_id
            )));
        }
        resolve_entry(&dir, &manifest)?;
        let status = verify_signature(&dir, &self.trusted_keys)?;

        let installation = match self.installations.get_installation(category, plugin_id).await? {
            Some(mut existing) => {
                existing.signature_status = status;
                existing.updated_at = chrono::Utc::now();
                existing
            }
            None => PluginInstallation::new_disabled(
                category,
                plugin_id,
                new_instance_id(category, plugin_id),
                status,
            ),
        };
        self.installations.upsert_installation(&installation).await?;
        tracing::info!(
            category,
            plugin_id,
            instance_id = %installation.instance_id,
            signature_status = %status,
            "plugin imported from disk"
        );

        self.installations
            .get_installation(category, plugin_id)
            .await?
            .ok_or_else(|| HangarError::Storage(format!("{category}:{plugin_id} vanished after upsert")))
    }

    /// Recompute the trust status of one plugin directory.
    pub fn signature_status_on_disk(
        &self,
        category: &str,
        plugin_id: &str,
    ) -> Result<SignatureStatus, HangarError> {
        let (category, plugin_id) = (category.trim(), plugin_id.trim());
        if category.is_empty() || plugin_id.is_empty() {
            return Err(HangarError::InvalidInput("invalid plugin".to_string()));
        }
        let dir = self.plugin_dir(category, plugin_id);
        if !dir.join(MANIFEST_FILE).is_file() {
            return Err(HangarError::NotFound(format!("{MANIFEST_FILE} not found")));
        }
        verify_signature(&dir, &self.trusted_keys)
    }

    async fn installed_keys(&self) -> Result<HashSet<String>, HangarError> {
        Ok(self
            .installations
            .list_installations()
            .await?
            .iter()
            .map(PluginInstallation::key)
            .collect())
    }

    async fn insert_new(&self, plugin: &DiscoveredPlugin, status: SignatureStatus) -> Result<(), HangarError> {
        let installation = PluginInstallation::new_disabled(
            &plugin.category,
            &plugin.plugin_id,
            new_instance_id(&plugin.category, &plugin.plugin_id),
            status,
        );
        self.installations.upsert_installation(&installation).await?;
        tracing::info!(
            category = %plugin.category,
            plugin_id = %plugin.plugin_id,
            instance_id = %installation.instance_id,
            signature_status = %status,
            "plugin installed disabled"
        );
        Ok(())
    }

    /// Bootstrap and discovery never fail a whole pass over one unreadable signature.
    fn signature_status_lenient(&self, dir: &Path) -> SignatureStatus {
        verify_signature(dir, &self.trusted_keys).unwrap_or_else(|e| {
            tracing::warn!(dir = %dir.display(), error = %e, "signature check failed");
            SignatureStatus::Untrusted
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_test_utils::{MemoryInstallationStore, MemorySettingsStore, PluginFixture, PluginTree};
    use hangar_verify::{SigningKeypair, sign_plugin_dir};
    use tracing_test::traced_test;

    struct Env {
        tree: PluginTree,
        key: SigningKeypair,
        store: Arc<MemoryInstallationStore>,
        settings: Arc<MemorySettingsStore>,
        discovery: Discovery,
    }

    fn env() -> Env {
        let tree = PluginTree::new();
        let key = SigningKeypair::generate();
        let store = Arc::new(MemoryInstallationStore::new());
        let settings = Arc::new(MemorySettingsStore::new());
        let discovery = Discovery::new(
            tree.base_dir(),
            vec![key.verifying_key()],
            store.clone(),
            settings.clone(),
        );
        Env {
            tree,
            key,
            store,
            settings,
            discovery,
        }
    }

    #[test]
    fn parse_bool_setting_is_lenient() {
        for raw in ["true", "\"true\"", " TRUE ", "1", "yes", "Y"] {
            assert_eq!(parse_bool_setting(raw), Some(true), "{raw}");
        }
        for raw in ["false", "\"0\"", "No", "n"] {
            assert_eq!(parse_bool_setting(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_bool_setting("maybe"), None);
        assert_eq!(parse_bool_setting(""), None);
    }

    #[test]
    fn instance_ids_are_unique_and_prefixed() {
        let a = new_instance_id("sms", "alisms");
        let b = new_instance_id("sms", "alisms");
        assert!(a.starts_with("sms-alisms-"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn first_run_adopts_everything_disabled() {
        let env = env();
        env.tree.add(&PluginFixture::new("sms", "alisms"));
        env.tree.add(&PluginFixture::new("payment", "ezpay"));
        let signed = env.tree.add(&PluginFixture::new("kyc", "faceid"));
        sign_plugin_dir(&signed, env.key.signing_key()).unwrap();

        let report = env.discovery.bootstrap_from_disk().await.unwrap();
        assert!(report.first_run);
        assert_eq!(report.imported.len(), 3);

        let all = env.store.list_installations().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|i| !i.enabled && i.config_cipher.is_empty()));
        let kyc = env.store.get_installation("kyc", "faceid").await.unwrap().unwrap();
        assert_eq!(kyc.signature_status, SignatureStatus::Official);
        let sms = env.store.get_installation("sms", "alisms").await.unwrap().unwrap();
        assert_eq!(sms.signature_status, SignatureStatus::Unsigned);

        let flag = env.settings.get_setting(BOOTSTRAPPED_SETTING).await.unwrap().unwrap();
        assert_eq!(parse_bool_setting(&flag.value_json), Some(true));
    }

    #[tokio::test]
    #[traced_test]
    async fn steady_state_only_auto_imports_official() {
        let env = env();
        env.tree.add(&PluginFixture::new("sms", "alisms"));
        env.discovery.bootstrap_from_disk().await.unwrap();

        env.tree.add(&PluginFixture::new("sms", "twilio"));
        let other = SigningKeypair::generate();
        let foreign = env.tree.add(&PluginFixture::new("sms", "foreign"));
        sign_plugin_dir(&foreign, other.signing_key()).unwrap();

        let report = env.discovery.bootstrap_from_disk().await.unwrap();
        assert!(!report.first_run);
        assert!(report.imported.is_empty());
        assert!(logs_contain("new plugin on disk needs a manual import"));

        let official = env.tree.add(&PluginFixture::new("payment", "ezpay"));
        sign_plugin_dir(&official, env.key.signing_key()).unwrap();
        let report = env.discovery.bootstrap_from_disk().await.unwrap();
        assert_eq!(report.imported, vec!["payment:ezpay".to_string()]);
        assert_eq!(env.store.list_installations().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_store_forces_first_run_even_when_flagged() {
        let env = env();
        env.settings
            .upsert_setting(&Setting::new(BOOTSTRAPPED_SETTING, "\"true\""))
            .await
            .unwrap();
        env.tree.add(&PluginFixture::new("sms", "alisms"));

        let report = env.discovery.bootstrap_from_disk().await.unwrap();
        assert!(report.first_run);
        assert_eq!(report.imported.len(), 1);
    }

    #[tokio::test]
    async fn discover_lists_only_uninstalled_and_writes_nothing() {
        let env = env();
        env.tree.add(&PluginFixture::new("sms", "alisms"));
        env.discovery.bootstrap_from_disk().await.unwrap();

        env.tree.add(
            &PluginFixture::new("sms", "exotic")
                .name("Exotic")
                .version("2.0.0")
                .platforms(&["plan9_mips"]),
        );

        let items = env.discovery.discover_on_disk().await.unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.plugin_id, "exotic");
        assert_eq!(item.name, "Exotic");
        assert_eq!(item.version, "2.0.0");
        assert_eq!(item.signature_status, SignatureStatus::Unsigned);
        assert_eq!(item.entry.supported_platforms, vec!["plan9_mips".to_string()]);
        assert!(item.entry.entry_path.is_none());
        assert!(item.entry_error.as_deref().unwrap().contains("unsupported platform"));

        assert_eq!(env.store.list_installations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn import_preserves_enabled_and_config() {
        let env = env();
        let dir = env.tree.add(&PluginFixture::new("sms", "alisms"));
        let first = env.discovery.import_from_disk("sms", "alisms").await.unwrap();
        assert!(!first.enabled);
        assert_eq!(first.signature_status, SignatureStatus::Unsigned);

        let mut changed = first.clone();
        changed.enabled = true;
        changed.config_cipher = "sealed".into();
        env.store.upsert_installation(&changed).await.unwrap();

        sign_plugin_dir(&dir, env.key.signing_key()).unwrap();
        let again = env.discovery.import_from_disk(" sms ", "alisms").await.unwrap();
        assert_eq!(again.signature_status, SignatureStatus::Official);
        assert!(again.enabled);
        assert_eq!(again.config_cipher, "sealed");
        assert_eq!(again.instance_id, first.instance_id);
    }

    #[tokio::test]
    async fn import_rejects_bad_input() {
        let env = env();
        assert!(matches!(
            env.discovery.import_from_disk("", "x").await,
            Err(HangarError::InvalidInput(_))
        ));
        assert!(matches!(
            env.discovery.import_from_disk("sms", "missing").await,
            Err(HangarError::NotFound(_))
        ));

        env.tree.add(&PluginFixture::new("sms", "renamed").declared_id("other"));
        let err = env.discovery.import_from_disk("sms", "renamed").await.unwrap_err();
        assert!(err.to_string().contains("manifest plugin_id mismatch"));

        env.tree.add(&PluginFixture::new("sms", "exotic").platforms(&["plan9_mips", "beos_x86"]));
        let err = env.discovery.import_from_disk("sms", "exotic").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "unsupported platform {}, supported: beos_x86, plan9_mips",
                hangar_verify::current_platform()
            )
        );
        assert!(env.store.list_installations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn signature_status_on_disk_requires_manifest() {
        let env = env();
        std::fs::create_dir_all(env.tree.base_dir().join("sms").join("bare")).unwrap();
        assert!(matches!(
            env.discovery.signature_status_on_disk("sms", "bare"),
            Err(HangarError::NotFound(_))
        ));

        let dir = env.tree.add(&PluginFixture::new("sms", "alisms"));
        assert_eq!(
            env.discovery.signature_status_on_disk("sms", "alisms").unwrap(),
            SignatureStatus::Unsigned
        );
        sign_plugin_dir(&dir, env.key.signing_key()).unwrap();
        assert_eq!(
            env.discovery.signature_status_on_disk("sms", "alisms").unwrap(),
            SignatureStatus::Official
        );
    }
}
