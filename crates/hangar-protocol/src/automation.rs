// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `automation` service: instance provisioning and lifecycle.
//!
//! Instance ids are `i64`, times are Unix seconds. Void operations answer
//! with an [`Ack`].

use serde::{Deserialize, Serialize};

use crate::impl_outcome;

pub const CREATE_INSTANCE: &str = "CreateInstance";
pub const GET_INSTANCE: &str = "GetInstance";
pub const LIST_INSTANCES_SIMPLE: &str = "ListInstancesSimple";
pub const ELASTIC_UPDATE: &str = "ElasticUpdate";
pub const RENEW: &str = "Renew";
pub const LOCK: &str = "Lock";
pub const UNLOCK: &str = "Unlock";
pub const DESTROY: &str = "Destroy";
pub const START: &str = "Start";
pub const SHUTDOWN: &str = "Shutdown";
pub const REBOOT: &str = "Reboot";
pub const REBUILD: &str = "Rebuild";
pub const RESET_PASSWORD: &str = "ResetPassword";
pub const LIST_SNAPSHOTS: &str = "ListSnapshots";
pub const CREATE_SNAPSHOT: &str = "CreateSnapshot";
pub const DELETE_SNAPSHOT: &str = "DeleteSnapshot";
pub const RESTORE_SNAPSHOT: &str = "RestoreSnapshot";
pub const LIST_BACKUPS: &str = "ListBackups";
pub const CREATE_BACKUP: &str = "CreateBackup";
pub const DELETE_BACKUP: &str = "DeleteBackup";
pub const RESTORE_BACKUP: &str = "RestoreBackup";
pub const LIST_FIREWALL_RULES: &str = "ListFirewallRules";
pub const ADD_FIREWALL_RULE: &str = "AddFirewallRule";
pub const DELETE_FIREWALL_RULE: &str = "DeleteFirewallRule";
pub const LIST_PORT_MAPPINGS: &str = "ListPortMappings";
pub const ADD_PORT_MAPPING: &str = "AddPortMapping";
pub const DELETE_PORT_MAPPING: &str = "DeletePortMapping";
pub const FIND_PORT_CANDIDATES: &str = "FindPortCandidates";
pub const GET_PANEL_URL: &str = "GetPanelURL";
pub const GET_VNC_URL: &str = "GetVNCURL";
pub const LIST_AREAS: &str = "ListAreas";
pub const LIST_IMAGES: &str = "ListImages";
pub const LIST_LINES: &str = "ListLines";
pub const LIST_PACKAGES: &str = "ListPackages";
pub const GET_MONITOR: &str = "GetMonitor";

/// Answer to operations that return nothing but may be refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub ok: bool,
    pub error: String,
}

impl Default for Ack {
    fn default() -> Self {
        Self {
            ok: true,
            error: String::new(),
        }
    }
}

/// Request addressed to a single instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceRequest {
    pub instance_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateInstanceRequest {
    pub line_id: i64,
    pub os: String,
    pub name: String,
    pub password: String,
    pub vnc_password: String,
    pub expire_at_unix: i64,
    pub port_num: i32,
    pub cpu: i32,
    pub memory_gb: i32,
    pub disk_gb: i32,
    pub bandwidth_mbps: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateInstanceResponse {
    pub instance_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub id: i64,
    pub name: String,
    pub state: i32,
    pub cpu: i32,
    pub memory_gb: i32,
    pub disk_gb: i32,
    pub bandwidth_mbps: i32,
    pub panel_password: String,
    pub vnc_password: String,
    pub os_password: String,
    pub remote_ip: String,
    /// Zero when the instance has no expiry.
    pub expire_at_unix: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstanceResponse {
    pub instance: Instance,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListInstancesSimpleRequest {
    pub search_tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceSimple {
    pub id: i64,
    pub name: String,
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListInstancesSimpleResponse {
    pub items: Vec<InstanceSimple>,
}

/// Only the present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticUpdateRequest {
    pub instance_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_gb: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_mbps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_num: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenewRequest {
    pub instance_id: i64,
    pub next_due_at_unix: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildRequest {
    pub instance_id: i64,
    pub image_id: i64,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub instance_id: i64,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotRequest {
    pub instance_id: i64,
    pub snapshot_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupRequest {
    pub instance_id: i64,
    pub backup_id: i64,
}

/// A snapshot or backup point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestorePoint {
    pub id: i64,
    pub name: String,
    pub created_at_unix: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRestorePointsResponse {
    pub items: Vec<RestorePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    pub id: i64,
    pub direction: String,
    pub protocol: String,
    pub method: String,
    pub port: String,
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListFirewallRulesResponse {
    pub items: Vec<FirewallRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddFirewallRuleRequest {
    pub instance_id: i64,
    pub direction: String,
    pub protocol: String,
    pub method: String,
    pub port: String,
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteFirewallRuleRequest {
    pub instance_id: i64,
    pub rule_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortMapping {
    pub id: i64,
    pub name: String,
    pub sport: i64,
    pub dport: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPortMappingsResponse {
    pub items: Vec<PortMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddPortMappingRequest {
    pub instance_id: i64,
    pub name: String,
    pub sport: i64,
    pub dport: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletePortMappingRequest {
    pub instance_id: i64,
    pub mapping_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindPortCandidatesRequest {
    pub instance_id: i64,
    pub keywords: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindPortCandidatesResponse {
    pub ports: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetPanelUrlRequest {
    pub instance_name: String,
    pub panel_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlResponse {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub state: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListAreasResponse {
    pub items: Vec<Area>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineRequest {
    pub line_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListImagesResponse {
    pub items: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    pub id: i64,
    pub name: String,
    pub area_id: i64,
    pub state: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListLinesResponse {
    pub items: Vec<Line>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    pub id: i64,
    pub name: String,
    pub cpu: i32,
    pub memory_gb: i32,
    pub disk_gb: i32,
    pub bandwidth_mbps: i32,
    /// Minor units.
    pub monthly_price: i64,
    pub port_num: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPackagesResponse {
    pub items: Vec<Package>,
}

/// Utilization as reported by the provider, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetMonitorResponse {
    pub raw_json: String,
}

impl_outcome!(Ack);
