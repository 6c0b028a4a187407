// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed clients over a plugin connection, one per service contract.

use std::sync::Arc;
use std::time::Duration;

use hangar_core::HangarError;
use hangar_protocol::Service;
use hangar_protocol::kyc::{self, KycQueryRequest, KycQueryResponse, KycStartRequest, KycStartResponse};
use hangar_protocol::lifecycle::{
    self, ConfigSchema, Empty, HealthCheckRequest, HealthCheckResponse, InitRequest, InitResponse, Manifest,
    ReloadConfigRequest, ReloadConfigResponse, ValidateConfigRequest, ValidateConfigResponse,
};
use hangar_protocol::payment::{
    self, CreatePaymentRequest, CreatePaymentResponse, ListMethodsResponse, NotifyVerifyResult, QueryPaymentRequest,
    QueryPaymentResponse, RefundRequest, RefundResponse, VerifyNotifyRequest,
};
use hangar_protocol::sms::{self, SendSmsRequest, SendSmsResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::connection::RpcConnection;

/// The mandatory lifecycle service.
#[derive(Debug, Clone)]
pub struct CoreClient {
    conn: Arc<RpcConnection>,
}

impl CoreClient {
    pub fn new(conn: Arc<RpcConnection>) -> Self {
        Self { conn }
    }

    pub async fn get_manifest(&self, timeout: Duration) -> Result<Manifest, HangarError> {
        self.conn
            .call(Service::Core, lifecycle::GET_MANIFEST, &Empty {}, timeout)
            .await
    }

    pub async fn get_config_schema(&self, timeout: Duration) -> Result<ConfigSchema, HangarError> {
        self.conn
            .call(Service::Core, lifecycle::GET_CONFIG_SCHEMA, &Empty {}, timeout)
            .await
    }

    pub async fn validate_config(
        &self,
        config_json: &str,
        timeout: Duration,
    ) -> Result<ValidateConfigResponse, HangarError> {
        let req = ValidateConfigRequest {
            config_json: config_json.to_string(),
        };
        self.conn
            .call(Service::Core, lifecycle::VALIDATE_CONFIG, &req, timeout)
            .await
    }

    pub async fn init(
        &self,
        instance_id: &str,
        config_json: &str,
        timeout: Duration,
    ) -> Result<InitResponse, HangarError> {
        let req = InitRequest {
            instance_id: instance_id.to_string(),
            config_json: config_json.to_string(),
        };
        self.conn.call(Service::Core, lifecycle::INIT, &req, timeout).await
    }

    pub async fn reload_config(
        &self,
        config_json: &str,
        timeout: Duration,
    ) -> Result<ReloadConfigResponse, HangarError> {
        let req = ReloadConfigRequest {
            config_json: config_json.to_string(),
        };
        self.conn
            .call(Service::Core, lifecycle::RELOAD_CONFIG, &req, timeout)
            .await
    }

    pub async fn health(&self, instance_id: &str, timeout: Duration) -> Result<HealthCheckResponse, HangarError> {
        let req = HealthCheckRequest {
            instance_id: instance_id.to_string(),
        };
        self.conn.call(Service::Core, lifecycle::HEALTH, &req, timeout).await
    }
}

#[derive(Debug, Clone)]
pub struct SmsClient {
    conn: Arc<RpcConnection>,
}

impl SmsClient {
    pub fn new(conn: Arc<RpcConnection>) -> Self {
        Self { conn }
    }

    pub async fn send(&self, req: &SendSmsRequest, timeout: Duration) -> Result<SendSmsResponse, HangarError> {
        self.conn.call(Service::Sms, sms::SEND, req, timeout).await
    }
}

#[derive(Debug, Clone)]
pub struct PaymentClient {
    conn: Arc<RpcConnection>,
}

impl PaymentClient {
    pub fn new(conn: Arc<RpcConnection>) -> Self {
        Self { conn }
    }

    pub async fn list_methods(&self, timeout: Duration) -> Result<ListMethodsResponse, HangarError> {
        self.conn
            .call(Service::Payment, payment::LIST_METHODS, &Empty {}, timeout)
            .await
    }

    pub async fn create_payment(
        &self,
        req: &CreatePaymentRequest,
        timeout: Duration,
    ) -> Result<CreatePaymentResponse, HangarError> {
        self.conn
            .call(Service::Payment, payment::CREATE_PAYMENT, req, timeout)
            .await
    }

    pub async fn query_payment(
        &self,
        req: &QueryPaymentRequest,
        timeout: Duration,
    ) -> Result<QueryPaymentResponse, HangarError> {
        self.conn
            .call(Service::Payment, payment::QUERY_PAYMENT, req, timeout)
            .await
    }

    pub async fn refund(&self, req: &RefundRequest, timeout: Duration) -> Result<RefundResponse, HangarError> {
        self.conn.call(Service::Payment, payment::REFUND, req, timeout).await
    }

    pub async fn verify_notify(
        &self,
        req: &VerifyNotifyRequest,
        timeout: Duration,
    ) -> Result<NotifyVerifyResult, HangarError> {
        self.conn
            .call(Service::Payment, payment::VERIFY_NOTIFY, req, timeout)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct KycClient {
    conn: Arc<RpcConnection>,
}

impl KycClient {
    pub fn new(conn: Arc<RpcConnection>) -> Self {
        Self { conn }
    }

    pub async fn start(&self, req: &KycStartRequest, timeout: Duration) -> Result<KycStartResponse, HangarError> {
        self.conn.call(Service::Kyc, kyc::START, req, timeout).await
    }

    pub async fn query_result(
        &self,
        req: &KycQueryRequest,
        timeout: Duration,
    ) -> Result<KycQueryResponse, HangarError> {
        self.conn.call(Service::Kyc, kyc::QUERY_RESULT, req, timeout).await
    }
}

/// Automation has a wide surface; callers name the method directly.
#[derive(Debug, Clone)]
pub struct AutomationClient {
    conn: Arc<RpcConnection>,
}

impl AutomationClient {
    pub fn new(conn: Arc<RpcConnection>) -> Self {
        Self { conn }
    }

    pub async fn call<P, R>(&self, method: &str, params: &P, timeout: Duration) -> Result<R, HangarError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.conn.call(Service::Automation, method, params, timeout).await
    }
}
