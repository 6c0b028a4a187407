// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud-instance automation backed by a running automation plugin.
//!
//! The adapter never caches a client: each call looks the plugin up in the
//! runtime, so a stop or restart is observed on the very next call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hangar_core::{HangarError, category};
use hangar_protocol::automation::{
    self as wire, Ack, AddFirewallRuleRequest, AddPortMappingRequest, Area, BackupRequest, CreateInstanceRequest,
    CreateInstanceResponse, DeleteFirewallRuleRequest, DeletePortMappingRequest, ElasticUpdateRequest,
    FindPortCandidatesRequest, FindPortCandidatesResponse, FirewallRule, GetInstanceResponse, GetMonitorResponse,
    GetPanelUrlRequest, Image, InstanceRequest, LineRequest, ListAreasResponse, ListFirewallRulesResponse,
    ListImagesResponse, ListInstancesSimpleRequest, ListInstancesSimpleResponse, ListLinesResponse,
    ListPackagesResponse, ListPortMappingsResponse, ListRestorePointsResponse, Package, PortMapping, RebuildRequest,
    RenewRequest, ResetPasswordRequest, SnapshotRequest, UrlResponse,
};
use hangar_protocol::lifecycle::Empty;
use hangar_runtime::{AutomationClient, PluginRuntime};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::DEFAULT_CALL_TIMEOUT;
use crate::monitor::{Monitor, parse_monitor};
use crate::outcome::{ensure_ok, map_unimplemented};
use crate::target::running_instance;

/// Parameters for provisioning a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHost {
    pub line_id: i64,
    pub os: String,
    pub host_name: String,
    pub sys_password: String,
    pub vnc_password: String,
    pub expire_at: DateTime<Utc>,
    pub port_num: i32,
    pub cpu: i32,
    pub memory_gb: i32,
    pub disk_gb: i32,
    pub bandwidth_mbps: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    pub host_id: i64,
    pub host_name: String,
    pub state: i32,
    pub cpu: i32,
    pub memory_gb: i32,
    pub disk_gb: i32,
    pub bandwidth_mbps: i32,
    pub panel_password: String,
    pub vnc_password: String,
    pub os_password: String,
    pub remote_ip: String,
    /// `None` when the provider reports no expiry.
    pub expire_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSimple {
    pub id: i64,
    pub host_name: String,
    pub ip: String,
}

/// A snapshot or backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestorePoint {
    pub id: i64,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Resize request. Absent fields are left unchanged by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElasticUpdate {
    pub host_id: i64,
    pub cpu: Option<i32>,
    pub memory_gb: Option<i32>,
    pub disk_gb: Option<i32>,
    pub bandwidth_mbps: Option<i32>,
    pub port_num: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRuleCreate {
    pub host_id: i64,
    pub direction: String,
    pub protocol: String,
    pub method: String,
    pub port: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMappingCreate {
    pub host_id: i64,
    pub name: String,
    pub sport: i64,
    pub dport: i64,
}

/// Automation calls against one plugin instance.
#[derive(Clone)]
pub struct AutomationAdapter {
    runtime: Arc<PluginRuntime>,
    plugin_id: String,
    instance_id: String,
    timeout: Duration,
}

impl AutomationAdapter {
    pub fn new(runtime: Arc<PluginRuntime>, plugin_id: &str, instance_id: &str) -> Self {
        Self {
            runtime,
            plugin_id: plugin_id.trim().to_string(),
            instance_id: instance_id.trim().to_string(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn client(&self) -> Result<AutomationClient, HangarError> {
        running_instance(&self.runtime, category::AUTOMATION, &self.plugin_id, &self.instance_id)?.automation()
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, HangarError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let client = self.client()?;
        client
            .call(method, params, self.timeout)
            .await
            .map_err(map_unimplemented)
    }

    async fn ack<P: Serialize + ?Sized>(&self, method: &str, params: &P) -> Result<(), HangarError> {
        let ack: Ack = self.call(method, params).await?;
        ensure_ok(ack, &format!("{method} failed")).map(drop)
    }

    pub async fn create_host(&self, req: &CreateHost) -> Result<i64, HangarError> {
        let wire_req = CreateInstanceRequest {
            line_id: req.line_id,
            os: req.os.clone(),
            name: req.host_name.clone(),
            password: req.sys_password.clone(),
            vnc_password: req.vnc_password.clone(),
            expire_at_unix: req.expire_at.timestamp(),
            port_num: req.port_num,
            cpu: req.cpu,
            memory_gb: req.memory_gb,
            disk_gb: req.disk_gb,
            bandwidth_mbps: req.bandwidth_mbps,
        };
        let resp: CreateInstanceResponse = self.call(wire::CREATE_INSTANCE, &wire_req).await?;
        Ok(resp.instance_id)
    }

    pub async fn get_host_info(&self, host_id: i64) -> Result<HostInfo, HangarError> {
        let resp: GetInstanceResponse = self.call(wire::GET_INSTANCE, &instance(host_id)).await?;
        let inst = resp.instance;
        Ok(HostInfo {
            host_id: inst.id,
            host_name: inst.name,
            state: inst.state,
            cpu: inst.cpu,
            memory_gb: inst.memory_gb,
            disk_gb: inst.disk_gb,
            bandwidth_mbps: inst.bandwidth_mbps,
            panel_password: inst.panel_password,
            vnc_password: inst.vnc_password,
            os_password: inst.os_password,
            remote_ip: inst.remote_ip,
            expire_at: from_unix(inst.expire_at_unix),
        })
    }

    pub async fn list_hosts_simple(&self, search_tag: &str) -> Result<Vec<HostSimple>, HangarError> {
        let req = ListInstancesSimpleRequest {
            search_tag: search_tag.trim().to_string(),
        };
        let resp: ListInstancesSimpleResponse = self.call(wire::LIST_INSTANCES_SIMPLE, &req).await?;
        Ok(resp
            .items
            .into_iter()
            .map(|it| HostSimple {
                id: it.id,
                host_name: it.name,
                ip: it.ip,
            })
            .collect())
    }

    pub async fn elastic_update(&self, req: &ElasticUpdate) -> Result<(), HangarError> {
        let wire_req = ElasticUpdateRequest {
            instance_id: req.host_id,
            cpu: req.cpu,
            memory_gb: req.memory_gb,
            disk_gb: req.disk_gb,
            bandwidth_mbps: req.bandwidth_mbps,
            port_num: req.port_num,
        };
        self.ack(wire::ELASTIC_UPDATE, &wire_req).await
    }

    pub async fn renew(&self, host_id: i64, next_due: DateTime<Utc>) -> Result<(), HangarError> {
        let req = RenewRequest {
            instance_id: host_id,
            next_due_at_unix: next_due.timestamp(),
        };
        self.ack(wire::RENEW, &req).await
    }

    pub async fn lock(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::LOCK, &instance(host_id)).await
    }

    pub async fn unlock(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::UNLOCK, &instance(host_id)).await
    }

    pub async fn destroy(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::DESTROY, &instance(host_id)).await
    }

    pub async fn start(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::START, &instance(host_id)).await
    }

    pub async fn shutdown(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::SHUTDOWN, &instance(host_id)).await
    }

    pub async fn reboot(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::REBOOT, &instance(host_id)).await
    }

    /// Reinstall the OS from an image.
    pub async fn rebuild(&self, host_id: i64, image_id: i64, password: &str) -> Result<(), HangarError> {
        let req = RebuildRequest {
            instance_id: host_id,
            image_id,
            password: password.to_string(),
        };
        self.ack(wire::REBUILD, &req).await
    }

    pub async fn reset_password(&self, host_id: i64, password: &str) -> Result<(), HangarError> {
        let req = ResetPasswordRequest {
            instance_id: host_id,
            password: password.to_string(),
        };
        self.ack(wire::RESET_PASSWORD, &req).await
    }

    pub async fn list_snapshots(&self, host_id: i64) -> Result<Vec<RestorePoint>, HangarError> {
        let resp: ListRestorePointsResponse = self.call(wire::LIST_SNAPSHOTS, &instance(host_id)).await?;
        Ok(restore_points(resp))
    }

    pub async fn create_snapshot(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::CREATE_SNAPSHOT, &instance(host_id)).await
    }

    pub async fn delete_snapshot(&self, host_id: i64, snapshot_id: i64) -> Result<(), HangarError> {
        self.ack(wire::DELETE_SNAPSHOT, &snapshot(host_id, snapshot_id)).await
    }

    pub async fn restore_snapshot(&self, host_id: i64, snapshot_id: i64) -> Result<(), HangarError> {
        self.ack(wire::RESTORE_SNAPSHOT, &snapshot(host_id, snapshot_id)).await
    }

    pub async fn list_backups(&self, host_id: i64) -> Result<Vec<RestorePoint>, HangarError> {
        let resp: ListRestorePointsResponse = self.call(wire::LIST_BACKUPS, &instance(host_id)).await?;
        Ok(restore_points(resp))
    }

    pub async fn create_backup(&self, host_id: i64) -> Result<(), HangarError> {
        self.ack(wire::CREATE_BACKUP, &instance(host_id)).await
    }

    pub async fn delete_backup(&self, host_id: i64, backup_id: i64) -> Result<(), HangarError> {
        self.ack(wire::DELETE_BACKUP, &backup(host_id, backup_id)).await
    }

    pub async fn restore_backup(&self, host_id: i64, backup_id: i64) -> Result<(), HangarError> {
        self.ack(wire::RESTORE_BACKUP, &backup(host_id, backup_id)).await
    }

    pub async fn list_firewall_rules(&self, host_id: i64) -> Result<Vec<FirewallRule>, HangarError> {
        let resp: ListFirewallRulesResponse = self.call(wire::LIST_FIREWALL_RULES, &instance(host_id)).await?;
        Ok(resp.items)
    }

    pub async fn add_firewall_rule(&self, rule: &FirewallRuleCreate) -> Result<(), HangarError> {
        let req = AddFirewallRuleRequest {
            instance_id: rule.host_id,
            direction: rule.direction.clone(),
            protocol: rule.protocol.clone(),
            method: rule.method.clone(),
            port: rule.port.clone(),
            ip: rule.ip.clone(),
        };
        self.ack(wire::ADD_FIREWALL_RULE, &req).await
    }

    pub async fn delete_firewall_rule(&self, host_id: i64, rule_id: i64) -> Result<(), HangarError> {
        let req = DeleteFirewallRuleRequest {
            instance_id: host_id,
            rule_id,
        };
        self.ack(wire::DELETE_FIREWALL_RULE, &req).await
    }

    pub async fn list_port_mappings(&self, host_id: i64) -> Result<Vec<PortMapping>, HangarError> {
        let resp: ListPortMappingsResponse = self.call(wire::LIST_PORT_MAPPINGS, &instance(host_id)).await?;
        Ok(resp.items)
    }

    pub async fn add_port_mapping(&self, mapping: &PortMappingCreate) -> Result<(), HangarError> {
        let req = AddPortMappingRequest {
            instance_id: mapping.host_id,
            name: mapping.name.clone(),
            sport: mapping.sport,
            dport: mapping.dport,
        };
        self.ack(wire::ADD_PORT_MAPPING, &req).await
    }

    pub async fn delete_port_mapping(&self, host_id: i64, mapping_id: i64) -> Result<(), HangarError> {
        let req = DeletePortMappingRequest {
            instance_id: host_id,
            mapping_id,
        };
        self.ack(wire::DELETE_PORT_MAPPING, &req).await
    }

    /// Free ports on the host matching `keywords`.
    pub async fn find_port_candidates(&self, host_id: i64, keywords: &str) -> Result<Vec<i64>, HangarError> {
        let req = FindPortCandidatesRequest {
            instance_id: host_id,
            keywords: keywords.trim().to_string(),
        };
        let resp: FindPortCandidatesResponse = self.call(wire::FIND_PORT_CANDIDATES, &req).await?;
        Ok(resp.ports)
    }

    pub async fn panel_url(&self, host_name: &str, panel_password: &str) -> Result<String, HangarError> {
        let req = GetPanelUrlRequest {
            instance_name: host_name.to_string(),
            panel_password: panel_password.to_string(),
        };
        let resp: UrlResponse = self.call(wire::GET_PANEL_URL, &req).await?;
        Ok(resp.url)
    }

    pub async fn vnc_url(&self, host_id: i64) -> Result<String, HangarError> {
        let resp: UrlResponse = self.call(wire::GET_VNC_URL, &instance(host_id)).await?;
        Ok(resp.url)
    }

    pub async fn list_areas(&self) -> Result<Vec<Area>, HangarError> {
        let resp: ListAreasResponse = self.call(wire::LIST_AREAS, &Empty {}).await?;
        Ok(resp.items)
    }

    pub async fn list_images(&self, line_id: i64) -> Result<Vec<Image>, HangarError> {
        let resp: ListImagesResponse = self.call(wire::LIST_IMAGES, &LineRequest { line_id }).await?;
        Ok(resp.items)
    }

    pub async fn list_lines(&self) -> Result<Vec<wire::Line>, HangarError> {
        let resp: ListLinesResponse = self.call(wire::LIST_LINES, &Empty {}).await?;
        Ok(resp.items)
    }

    pub async fn list_packages(&self, line_id: i64) -> Result<Vec<Package>, HangarError> {
        let resp: ListPackagesResponse = self.call(wire::LIST_PACKAGES, &LineRequest { line_id }).await?;
        Ok(resp.items)
    }

    pub async fn monitor(&self, host_id: i64) -> Result<Monitor, HangarError> {
        let resp: GetMonitorResponse = self.call(wire::GET_MONITOR, &instance(host_id)).await?;
        parse_monitor(&resp.raw_json)
    }
}

impl std::fmt::Debug for AutomationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationAdapter")
            .field("plugin_id", &self.plugin_id)
            .field("instance_id", &self.instance_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn instance(host_id: i64) -> InstanceRequest {
    InstanceRequest { instance_id: host_id }
}

fn snapshot(host_id: i64, snapshot_id: i64) -> SnapshotRequest {
    SnapshotRequest {
        instance_id: host_id,
        snapshot_id,
    }
}

fn backup(host_id: i64, backup_id: i64) -> BackupRequest {
    BackupRequest {
        instance_id: host_id,
        backup_id,
    }
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

fn restore_points(resp: ListRestorePointsResponse) -> Vec<RestorePoint> {
    resp.items
        .into_iter()
        .map(|it| RestorePoint {
            id: it.id,
            name: it.name,
            created_at: from_unix(it.created_at_unix),
        })
        .collect()
}
