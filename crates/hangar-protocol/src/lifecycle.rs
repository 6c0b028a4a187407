// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mandatory `core` service: manifest, config schema, init and health.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Service, impl_outcome};

pub const GET_MANIFEST: &str = "GetManifest";
pub const GET_CONFIG_SCHEMA: &str = "GetConfigSchema";
pub const VALIDATE_CONFIG: &str = "ValidateConfig";
pub const INIT: &str = "Init";
pub const RELOAD_CONFIG: &str = "ReloadConfig";
pub const HEALTH: &str = "Health";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// What a running plugin says about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub plugin_id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub sms: Option<SmsCapability>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub payment: Option<PaymentCapability>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub kyc: Option<KycCapability>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "capability")]
    pub automation: Option<AutomationCapability>,
}

impl Manifest {
    /// Whether the manifest declares the given optional capability. Core is always declared.
    pub fn declares(&self, service: Service) -> bool {
        match service {
            Service::Core => true,
            Service::Sms => self.sms.is_some(),
            Service::Payment => self.payment.is_some(),
            Service::Kyc => self.kyc.is_some(),
            Service::Automation => self.automation.is_some(),
        }
    }

    /// Payment methods advertised by the manifest, empty when payment is not declared.
    pub fn payment_methods(&self) -> &[String] {
        self.payment.as_ref().map(|p| p.methods.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsCapability {
    pub send: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentCapability {
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KycCapability {
    pub start: bool,
    pub query_result: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationCapability {}

/// A capability block, as implied by the shorthand `"sms": true`.
pub trait Capability: Sized {
    fn declared() -> Self;
}

impl Capability for SmsCapability {
    fn declared() -> Self {
        Self { send: true }
    }
}

impl Capability for PaymentCapability {
    fn declared() -> Self {
        Self::default()
    }
}

impl Capability for KycCapability {
    fn declared() -> Self {
        Self {
            start: true,
            query_result: true,
        }
    }
}

impl Capability for AutomationCapability {
    fn declared() -> Self {
        Self {}
    }
}

/// Reads a capability given either as a block or as `true`/`false`.
///
/// `false` and `null` mean not declared. Use with
/// `#[serde(default, deserialize_with = "capability")]`.
pub fn capability<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Capability + Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Declared<T> {
        Flag(bool),
        Block(T),
    }

    Ok(match Option::<Declared<T>>::deserialize(deserializer)? {
        None | Some(Declared::Flag(false)) => None,
        Some(Declared::Flag(true)) => Some(T::declared()),
        Some(Declared::Block(block)) => Some(block),
    })
}

/// JSON schema and UI hints for the plugin's configuration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSchema {
    pub json_schema: String,
    pub ui_schema: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfigRequest {
    pub config_json: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfigResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitRequest {
    pub instance_id: String,
    pub config_json: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfigRequest {
    pub config_json: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfigResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckRequest {
    pub instance_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Ok,
    Degraded,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub message: String,
    pub unix_millis: i64,
}

impl_outcome!(ValidateConfigResponse, InitResponse, ReloadConfigResponse);
