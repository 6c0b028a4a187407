// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service traits a plugin implements, and their request dispatch.
//!
//! Every method of an optional service has a default body answering
//! `unimplemented`, so a plugin only overrides what its provider offers.

use std::future::Future;

use async_trait::async_trait;
use hangar_protocol::automation::{self, *};
use hangar_protocol::kyc::{self, KycQueryRequest, KycQueryResponse, KycStartRequest, KycStartResponse};
use hangar_protocol::lifecycle::{
    self, ConfigSchema, Empty, HealthCheckRequest, HealthCheckResponse, HealthStatus, InitRequest, InitResponse,
    Manifest, ReloadConfigRequest, ReloadConfigResponse, ValidateConfigRequest, ValidateConfigResponse,
};
use hangar_protocol::payment::{
    self, CreatePaymentRequest, CreatePaymentResponse, ListMethodsResponse, NotifyVerifyResult, QueryPaymentRequest,
    QueryPaymentResponse, RefundRequest, RefundResponse, VerifyNotifyRequest,
};
use hangar_protocol::sms::{self, SendSmsRequest, SendSmsResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::status::{ServiceResult, Status};

/// Lifecycle methods every plugin serves.
#[async_trait]
pub trait CoreService: Send + Sync + 'static {
    async fn get_manifest(&self) -> ServiceResult<Manifest>;

    async fn init(&self, req: InitRequest) -> ServiceResult<InitResponse>;

    async fn get_config_schema(&self) -> ServiceResult<ConfigSchema> {
        Ok(ConfigSchema::default())
    }

    async fn validate_config(&self, _req: ValidateConfigRequest) -> ServiceResult<ValidateConfigResponse> {
        Ok(ValidateConfigResponse {
            ok: true,
            error: String::new(),
        })
    }

    async fn reload_config(&self, _req: ReloadConfigRequest) -> ServiceResult<ReloadConfigResponse> {
        Err(Status::unimplemented("ReloadConfig"))
    }

    async fn health(&self, _req: HealthCheckRequest) -> ServiceResult<HealthCheckResponse> {
        Ok(HealthCheckResponse {
            status: HealthStatus::Ok,
            message: String::new(),
            unix_millis: unix_millis(),
        })
    }
}

#[async_trait]
pub trait SmsService: Send + Sync + 'static {
    async fn send(&self, _req: SendSmsRequest) -> ServiceResult<SendSmsResponse> {
        Err(Status::unimplemented("Send"))
    }
}

#[async_trait]
pub trait PaymentService: Send + Sync + 'static {
    async fn list_methods(&self) -> ServiceResult<ListMethodsResponse> {
        Err(Status::unimplemented("ListMethods"))
    }

    async fn create_payment(&self, _req: CreatePaymentRequest) -> ServiceResult<CreatePaymentResponse> {
        Err(Status::unimplemented("CreatePayment"))
    }

    async fn query_payment(&self, _req: QueryPaymentRequest) -> ServiceResult<QueryPaymentResponse> {
        Err(Status::unimplemented("QueryPayment"))
    }

    async fn refund(&self, _req: RefundRequest) -> ServiceResult<RefundResponse> {
        Err(Status::unimplemented("Refund"))
    }

    async fn verify_notify(&self, _req: VerifyNotifyRequest) -> ServiceResult<NotifyVerifyResult> {
        Err(Status::unimplemented("VerifyNotify"))
    }
}

#[async_trait]
pub trait KycService: Send + Sync + 'static {
    async fn start(&self, _req: KycStartRequest) -> ServiceResult<KycStartResponse> {
        Err(Status::unimplemented("Start"))
    }

    async fn query_result(&self, _req: KycQueryRequest) -> ServiceResult<KycQueryResponse> {
        Err(Status::unimplemented("QueryResult"))
    }
}

macro_rules! automation_service {
    ($($method:ident => $name:ident($req:ty) -> $resp:ty;)*) => {
        /// Cloud-instance provisioning and management.
        #[async_trait]
        pub trait AutomationService: Send + Sync + 'static {
            $(
                async fn $name(&self, _req: $req) -> ServiceResult<$resp> {
                    Err(Status::unimplemented(automation::$method))
                }
            )*
        }

        pub(crate) async fn dispatch_automation(
            svc: &dyn AutomationService,
            method: &str,
            params: Value,
        ) -> ServiceResult<Value> {
            match method {
                $(automation::$method => invoke(params, |req| svc.$name(req)).await,)*
                other => Err(Status::unimplemented(format!("automation.{other}"))),
            }
        }
    };
}

automation_service! {
    CREATE_INSTANCE => create_instance(CreateInstanceRequest) -> CreateInstanceResponse;
    GET_INSTANCE => get_instance(InstanceRequest) -> GetInstanceResponse;
    LIST_INSTANCES_SIMPLE => list_instances_simple(ListInstancesSimpleRequest) -> ListInstancesSimpleResponse;
    ELASTIC_UPDATE => elastic_update(ElasticUpdateRequest) -> Ack;
    RENEW => renew(RenewRequest) -> Ack;
    LOCK => lock(InstanceRequest) -> Ack;
    UNLOCK => unlock(InstanceRequest) -> Ack;
    DESTROY => destroy(InstanceRequest) -> Ack;
    START => start(InstanceRequest) -> Ack;
    SHUTDOWN => shutdown(InstanceRequest) -> Ack;
    REBOOT => reboot(InstanceRequest) -> Ack;
    REBUILD => rebuild(RebuildRequest) -> Ack;
    RESET_PASSWORD => reset_password(ResetPasswordRequest) -> Ack;
    LIST_SNAPSHOTS => list_snapshots(InstanceRequest) -> ListRestorePointsResponse;
    CREATE_SNAPSHOT => create_snapshot(InstanceRequest) -> Ack;
    DELETE_SNAPSHOT => delete_snapshot(SnapshotRequest) -> Ack;
    RESTORE_SNAPSHOT => restore_snapshot(SnapshotRequest) -> Ack;
    LIST_BACKUPS => list_backups(InstanceRequest) -> ListRestorePointsResponse;
    CREATE_BACKUP => create_backup(InstanceRequest) -> Ack;
    DELETE_BACKUP => delete_backup(BackupRequest) -> Ack;
    RESTORE_BACKUP => restore_backup(BackupRequest) -> Ack;
    LIST_FIREWALL_RULES => list_firewall_rules(InstanceRequest) -> ListFirewallRulesResponse;
    ADD_FIREWALL_RULE => add_firewall_rule(AddFirewallRuleRequest) -> Ack;
    DELETE_FIREWALL_RULE => delete_firewall_rule(DeleteFirewallRuleRequest) -> Ack;
    LIST_PORT_MAPPINGS => list_port_mappings(InstanceRequest) -> ListPortMappingsResponse;
    ADD_PORT_MAPPING => add_port_mapping(AddPortMappingRequest) -> Ack;
    DELETE_PORT_MAPPING => delete_port_mapping(DeletePortMappingRequest) -> Ack;
    FIND_PORT_CANDIDATES => find_port_candidates(FindPortCandidatesRequest) -> FindPortCandidatesResponse;
    GET_PANEL_URL => get_panel_url(GetPanelUrlRequest) -> UrlResponse;
    GET_VNC_URL => get_vnc_url(InstanceRequest) -> UrlResponse;
    LIST_AREAS => list_areas(Empty) -> ListAreasResponse;
    LIST_IMAGES => list_images(LineRequest) -> ListImagesResponse;
    LIST_LINES => list_lines(Empty) -> ListLinesResponse;
    LIST_PACKAGES => list_packages(LineRequest) -> ListPackagesResponse;
    GET_MONITOR => get_monitor(InstanceRequest) -> GetMonitorResponse;
}

fn unix_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Decode params, run the handler, encode its answer.
async fn invoke<Req, Resp, F, Fut>(params: Value, handler: F) -> ServiceResult<Value>
where
    Req: DeserializeOwned,
    Resp: Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = ServiceResult<Resp>>,
{
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    let req: Req = serde_json::from_value(params).map_err(|e| Status::invalid_params(e.to_string()))?;
    let resp = handler(req).await?;
    serde_json::to_value(resp).map_err(|e| Status::internal(e.to_string()))
}

pub(crate) async fn dispatch_core(svc: &dyn CoreService, method: &str, params: Value) -> ServiceResult<Value> {
    match method {
        lifecycle::GET_MANIFEST => invoke(params, |_: Empty| svc.get_manifest()).await,
        lifecycle::GET_CONFIG_SCHEMA => invoke(params, |_: Empty| svc.get_config_schema()).await,
        lifecycle::VALIDATE_CONFIG => invoke(params, |req| svc.validate_config(req)).await,
        lifecycle::INIT => invoke(params, |req| svc.init(req)).await,
        lifecycle::RELOAD_CONFIG => invoke(params, |req| svc.reload_config(req)).await,
        lifecycle::HEALTH => invoke(params, |req| svc.health(req)).await,
        other => Err(Status::unimplemented(format!("core.{other}"))),
    }
}

pub(crate) async fn dispatch_sms(svc: &dyn SmsService, method: &str, params: Value) -> ServiceResult<Value> {
    match method {
        sms::SEND => invoke(params, |req| svc.send(req)).await,
        other => Err(Status::unimplemented(format!("sms.{other}"))),
    }
}

pub(crate) async fn dispatch_payment(svc: &dyn PaymentService, method: &str, params: Value) -> ServiceResult<Value> {
    match method {
        payment::LIST_METHODS => invoke(params, |_: Empty| svc.list_methods()).await,
        payment::CREATE_PAYMENT => invoke(params, |req| svc.create_payment(req)).await,
        payment::QUERY_PAYMENT => invoke(params, |req| svc.query_payment(req)).await,
        payment::REFUND => invoke(params, |req| svc.refund(req)).await,
        payment::VERIFY_NOTIFY => invoke(params, |req| svc.verify_notify(req)).await,
        other => Err(Status::unimplemented(format!("payment.{other}"))),
    }
}

pub(crate) async fn dispatch_kyc(svc: &dyn KycService, method: &str, params: Value) -> ServiceResult<Value> {
    match method {
        kyc::START => invoke(params, |req| svc.start(req)).await,
        kyc::QUERY_RESULT => invoke(params, |req| svc.query_result(req)).await,
        other => Err(Status::unimplemented(format!("kyc.{other}"))),
    }
}
