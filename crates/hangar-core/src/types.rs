// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by discovery, storage and the runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Well-known plugin categories. Directories on disk may use others.
pub mod category {
    pub const AUTOMATION: &str = "automation";
    pub const PAYMENT: &str = "payment";
    pub const SMS: &str = "sms";
    pub const KYC: &str = "kyc";
}

/// Trust classification of a plugin's on-disk signature evidence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SignatureStatus {
    /// Signature verifies against a trusted key.
    Official,
    /// Signature present but does not verify.
    Untrusted,
    /// No signature artifact.
    Unsigned,
}

/// One persisted installation per `(category, plugin_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInstallation {
    /// Store-assigned row id (0 before the first upsert).
    pub id: i64,
    pub category: String,
    pub plugin_id: String,
    /// Generated once at first import and never changed afterwards.
    pub instance_id: String,
    pub enabled: bool,
    pub signature_status: SignatureStatus,
    /// Sealed configuration. Never plaintext.
    pub config_cipher: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PluginInstallation {
    /// A fresh, disabled installation with empty configuration.
    pub fn new_disabled(
        category: impl Into<String>,
        plugin_id: impl Into<String>,
        instance_id: impl Into<String>,
        signature_status: SignatureStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            category: category.into(),
            plugin_id: plugin_id.into(),
            instance_id: instance_id.into(),
            enabled: false,
            signature_status,
            config_cipher: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The `category:plugin_id` key used for table lookups.
    pub fn key(&self) -> String {
        format!("{}:{}", self.category, self.plugin_id)
    }
}

/// A key/value row in the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value_json: String,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(key: impl Into<String>, value_json: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_json: value_json.into(),
            updated_at: Utc::now(),
        }
    }
}
