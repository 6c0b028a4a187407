// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable plugin process used by end-to-end tests.
//!
//! Serves whatever capabilities its on-disk manifest declares, behaving as
//! described by `mock.json` in its working directory.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hangar_sdk::protocol::automation::{
    Ack, CreateInstanceRequest, CreateInstanceResponse, GetInstanceResponse, GetMonitorResponse, Instance,
    InstanceRequest, UrlResponse,
};
use hangar_sdk::protocol::kyc::{KycQueryRequest, KycQueryResponse, KycStartRequest, KycStartResponse};
use hangar_sdk::protocol::lifecycle::{
    ConfigSchema, HealthCheckRequest, HealthCheckResponse, HealthStatus, InitRequest, InitResponse, Manifest,
    ReloadConfigRequest, ReloadConfigResponse, ValidateConfigRequest, ValidateConfigResponse,
};
use hangar_sdk::protocol::payment::{
    CreatePaymentRequest, CreatePaymentResponse, ListMethodsResponse, NotifyVerifyResult, PaymentStatus,
    QueryPaymentRequest, QueryPaymentResponse, VerifyNotifyRequest,
};
use hangar_sdk::protocol::sms::{SendSmsRequest, SendSmsResponse};
use hangar_sdk::protocol::MAGIC_COOKIE_KEY;
use hangar_sdk::{
    AutomationService, CoreService, KycService, PaymentService, PluginServer, ServiceResult, SmsService, Status,
    check_cookie,
};
use hangar_test_utils::mock::{MockBehavior, record_spawn};
use hangar_verify::read_manifest;

struct State {
    behavior: MockBehavior,
    manifest: Manifest,
    config: Mutex<String>,
    sent: AtomicU64,
}

impl State {
    async fn call_delay(&self) {
        pause(self.behavior.call_delay_ms).await;
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

struct Core(Arc<State>);
struct Sms(Arc<State>);
struct Payment(Arc<State>);
struct Kyc(Arc<State>);
struct Automation(Arc<State>);

#[async_trait]
impl CoreService for Core {
    async fn get_manifest(&self) -> ServiceResult<Manifest> {
        pause(self.0.behavior.manifest_delay_ms).await;
        let mut manifest = self.0.manifest.clone();
        if let Some(id) = &self.0.behavior.manifest_plugin_id {
            manifest.plugin_id = id.clone();
        }
        Ok(manifest)
    }

    async fn init(&self, req: InitRequest) -> ServiceResult<InitResponse> {
        pause(self.0.behavior.init_delay_ms).await;
        if !self.0.behavior.init_error.is_empty() {
            return Ok(InitResponse {
                ok: false,
                error: self.0.behavior.init_error.clone(),
            });
        }
        *self.0.config.lock().await = req.config_json;
        if let Some(ms) = self.0.behavior.exit_after_init_ms {
            tokio::spawn(async move {
                pause(ms).await;
                std::process::exit(0);
            });
        }
        Ok(InitResponse {
            ok: true,
            error: String::new(),
        })
    }

    async fn get_config_schema(&self) -> ServiceResult<ConfigSchema> {
        let json_schema = if self.0.behavior.config_schema.is_empty() {
            r#"{"type":"object","properties":{"api_key":{"type":"string"}}}"#.to_string()
        } else {
            self.0.behavior.config_schema.clone()
        };
        Ok(ConfigSchema {
            json_schema,
            ui_schema: String::new(),
        })
    }

    async fn validate_config(&self, _req: ValidateConfigRequest) -> ServiceResult<ValidateConfigResponse> {
        Ok(ValidateConfigResponse {
            ok: self.0.behavior.validate_error.is_empty(),
            error: self.0.behavior.validate_error.clone(),
        })
    }

    async fn reload_config(&self, req: ReloadConfigRequest) -> ServiceResult<ReloadConfigResponse> {
        if self.0.behavior.no_reload {
            return Err(Status::unimplemented("ReloadConfig"));
        }
        if !self.0.behavior.reload_error.is_empty() {
            return Ok(ReloadConfigResponse {
                ok: false,
                error: self.0.behavior.reload_error.clone(),
            });
        }
        *self.0.config.lock().await = req.config_json;
        Ok(ReloadConfigResponse {
            ok: true,
            error: String::new(),
        })
    }

    async fn health(&self, _req: HealthCheckRequest) -> ServiceResult<HealthCheckResponse> {
        pause(self.0.behavior.health_delay_ms).await;
        let config = self.0.config.lock().await.clone();
        Ok(HealthCheckResponse {
            status: HealthStatus::Ok,
            message: config,
            unix_millis: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[async_trait]
impl SmsService for Sms {
    async fn send(&self, req: SendSmsRequest) -> ServiceResult<SendSmsResponse> {
        self.0.call_delay().await;
        if req.phones.is_empty() {
            return Ok(SendSmsResponse {
                ok: false,
                error: "no recipients".to_string(),
                message_id: String::new(),
            });
        }
        let n = self.0.sent.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(SendSmsResponse {
            ok: true,
            error: String::new(),
            message_id: format!("msg-{n}"),
        })
    }
}

#[async_trait]
impl PaymentService for Payment {
    async fn list_methods(&self) -> ServiceResult<ListMethodsResponse> {
        Ok(ListMethodsResponse {
            methods: self.0.manifest.payment_methods().to_vec(),
        })
    }

    async fn create_payment(&self, req: CreatePaymentRequest) -> ServiceResult<CreatePaymentResponse> {
        self.0.call_delay().await;
        if req.method == "fail" {
            return Ok(CreatePaymentResponse {
                ok: false,
                error: "payment declined".to_string(),
                ..Default::default()
            });
        }
        let order_no = req.request.order_no;
        Ok(CreatePaymentResponse {
            ok: true,
            error: String::new(),
            trade_no: format!("T-{order_no}"),
            pay_url: format!("https://pay.example/{}/{order_no}", req.method),
            extra: req.request.extra,
        })
    }

    async fn query_payment(&self, req: QueryPaymentRequest) -> ServiceResult<QueryPaymentResponse> {
        self.0.call_delay().await;
        Ok(QueryPaymentResponse {
            ok: true,
            error: String::new(),
            status: PaymentStatus::Paid,
            amount: 100,
            trade_no: req.trade_no,
        })
    }

    async fn verify_notify(&self, req: VerifyNotifyRequest) -> ServiceResult<NotifyVerifyResult> {
        self.0.call_delay().await;
        let Ok(body) = serde_json::from_str::<serde_json::Value>(&req.raw.body) else {
            return Ok(NotifyVerifyResult {
                ok: false,
                error: "malformed notify body".to_string(),
                ..Default::default()
            });
        };
        let text = |key: &str| body.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let status = match text("status").as_str() {
            "paid" => PaymentStatus::Paid,
            "closed" => PaymentStatus::Closed,
            _ => PaymentStatus::Pending,
        };
        Ok(NotifyVerifyResult {
            ok: true,
            error: String::new(),
            order_no: text("order_no"),
            trade_no: text("trade_no"),
            amount: body.get("amount").and_then(|v| v.as_i64()).unwrap_or_default(),
            status,
            raw_json: req.raw.body.clone(),
            ack_body: "success".to_string(),
        })
    }
}

#[async_trait]
impl KycService for Kyc {
    async fn start(&self, req: KycStartRequest) -> ServiceResult<KycStartResponse> {
        self.0.call_delay().await;
        Ok(KycStartResponse {
            ok: true,
            error: String::new(),
            token: format!("tok-{}", req.user_id),
            url: format!("https://kyc.example/verify/{}", req.user_id),
            next_step: "redirect".to_string(),
        })
    }

    async fn query_result(&self, req: KycQueryRequest) -> ServiceResult<KycQueryResponse> {
        self.0.call_delay().await;
        if !req.token.starts_with("tok-") {
            return Ok(KycQueryResponse {
                ok: false,
                error: "unknown token".to_string(),
                ..Default::default()
            });
        }
        Ok(KycQueryResponse {
            ok: true,
            error: String::new(),
            status: "verified".to_string(),
            reason: String::new(),
            raw_json: r#"{"score":98}"#.to_string(),
        })
    }
}

#[async_trait]
impl AutomationService for Automation {
    async fn create_instance(&self, req: CreateInstanceRequest) -> ServiceResult<CreateInstanceResponse> {
        self.0.call_delay().await;
        Ok(CreateInstanceResponse {
            instance_id: 1000 + req.line_id,
        })
    }

    async fn get_instance(&self, req: InstanceRequest) -> ServiceResult<GetInstanceResponse> {
        self.0.call_delay().await;
        Ok(GetInstanceResponse {
            instance: Instance {
                id: req.instance_id,
                name: format!("vm-{}", req.instance_id),
                state: 1,
                cpu: 2,
                memory_gb: 4,
                disk_gb: 40,
                bandwidth_mbps: 100,
                remote_ip: "203.0.113.7".to_string(),
                expire_at_unix: 1_900_000_000,
                ..Default::default()
            },
        })
    }

    async fn lock(&self, _req: InstanceRequest) -> ServiceResult<Ack> {
        self.0.call_delay().await;
        Ok(Ack {
            ok: true,
            error: String::new(),
        })
    }

    async fn destroy(&self, _req: InstanceRequest) -> ServiceResult<Ack> {
        self.0.call_delay().await;
        Ok(Ack {
            ok: false,
            error: "instance is protected".to_string(),
        })
    }

    async fn get_vnc_url(&self, req: InstanceRequest) -> ServiceResult<UrlResponse> {
        self.0.call_delay().await;
        Ok(UrlResponse {
            url: format!("https://vnc.example/{}", req.instance_id),
        })
    }

    async fn get_monitor(&self, _req: InstanceRequest) -> ServiceResult<GetMonitorResponse> {
        self.0.call_delay().await;
        Ok(GetMonitorResponse {
            raw_json: self.0.behavior.monitor_json.clone(),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = check_cookie(std::env::var(MAGIC_COOKIE_KEY).ok().as_deref()) {
        eprintln!("hangar-mock-plugin: {e}");
        return ExitCode::FAILURE;
    }

    let dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("hangar-mock-plugin: no working directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = record_spawn(&dir) {
        eprintln!("hangar-mock-plugin: cannot record spawn: {e}");
    }
    let disk = match read_manifest(&dir) {
        Ok(disk) => disk,
        Err(e) => {
            eprintln!("hangar-mock-plugin: {e}");
            return ExitCode::FAILURE;
        }
    };

    let caps = disk.capabilities;
    let manifest = Manifest {
        plugin_id: disk.plugin_id,
        name: disk.name,
        version: disk.version,
        description: disk.description,
        sms: caps.sms,
        payment: caps.payment,
        kyc: caps.kyc,
        automation: caps.automation,
    };
    let state = Arc::new(State {
        behavior: MockBehavior::load(&dir),
        manifest: manifest.clone(),
        config: Mutex::new(String::new()),
        sent: AtomicU64::new(0),
    });
    eprintln!("hangar-mock-plugin {} serving", manifest.plugin_id);

    let mut server = PluginServer::new(Core(state.clone()));
    if manifest.sms.is_some() {
        server = server.with_sms(Sms(state.clone()));
    }
    if manifest.payment.is_some() {
        server = server.with_payment(Payment(state.clone()));
    }
    if manifest.kyc.is_some() {
        server = server.with_kyc(Kyc(state.clone()));
    }
    if manifest.automation.is_some() {
        server = server.with_automation(Automation(state));
    }

    match server.serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hangar-mock-plugin: {e}");
            ExitCode::FAILURE
        }
    }
}
