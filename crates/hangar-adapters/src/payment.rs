// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment providers backed by plugin payment methods.
//!
//! One plugin may expose several methods (`alipay`, `wxpay`, ...). Each
//! method is its own provider, keyed `<plugin_id>.<method>`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hangar_core::HangarError;
use hangar_protocol::payment::{
    CreatePaymentRequest, HttpRequest, PaymentCreateRequest, PaymentStatus, QueryPaymentRequest, RefundRequest,
    VerifyNotifyRequest,
};
use hangar_runtime::{PaymentClient, PluginRuntime};
use serde::Serialize;

use crate::DEFAULT_PAYMENT_TIMEOUT;
use crate::outcome::{ensure_ok, map_unimplemented};
use crate::target::running_instance;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentCreate {
    pub order_no: String,
    pub user_id: i64,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub subject: String,
    pub return_url: String,
    pub notify_url: String,
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentCreated {
    pub trade_no: String,
    pub pay_url: String,
    pub extra: BTreeMap<String, String>,
}

/// An inbound gateway callback, as received by the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHttpRequest {
    pub method: String,
    pub path: String,
    pub raw_query: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

/// Verified gateway notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentNotify {
    pub trade_no: String,
    pub paid: bool,
    pub amount: i64,
    /// `order_no`, `raw_json` and `status` as reported by the plugin.
    pub raw: BTreeMap<String, String>,
    /// Body the gateway expects back, passed through verbatim.
    pub ack_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentQuery {
    pub trade_no: String,
    pub status: PaymentStatus,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefundCreate {
    pub trade_no: String,
    pub amount: i64,
    pub reason: String,
}

/// A lookupable payment method.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Stable identifier, `<plugin_id>.<method>`.
    fn key(&self) -> String;

    /// Human-readable label.
    fn name(&self) -> String;

    /// Configuration JSON schema, empty when the provider has none.
    async fn schema_json(&self) -> String;

    async fn create_payment(&self, req: &PaymentCreate) -> Result<PaymentCreated, HangarError>;

    async fn verify_notify(&self, req: &RawHttpRequest) -> Result<PaymentNotify, HangarError>;

    async fn query_payment(&self, trade_no: &str) -> Result<PaymentQuery, HangarError>;

    /// Returns the gateway's refund number.
    async fn refund(&self, req: &RefundCreate) -> Result<String, HangarError>;
}

/// A [`PaymentProvider`] served by one method of a running payment plugin.
///
/// The plugin is looked up on every call; a stopped plugin, or one running
/// for another instance, fails with [`HangarError::NotRunning`].
#[derive(Clone)]
pub struct PluginPaymentProvider {
    runtime: Arc<PluginRuntime>,
    category: String,
    plugin_id: String,
    instance_id: String,
    method: String,
    name: String,
    timeout: Duration,
}

impl PluginPaymentProvider {
    pub fn new(
        runtime: Arc<PluginRuntime>,
        category: &str,
        plugin_id: &str,
        instance_id: &str,
        method: &str,
        name: &str,
    ) -> Self {
        Self {
            runtime,
            category: category.to_string(),
            plugin_id: plugin_id.to_string(),
            instance_id: instance_id.trim().to_string(),
            method: method.to_string(),
            name: name.trim().to_string(),
            timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    fn client(&self) -> Result<PaymentClient, HangarError> {
        running_instance(&self.runtime, &self.category, &self.plugin_id, &self.instance_id)?.payment()
    }
}

#[async_trait]
impl PaymentProvider for PluginPaymentProvider {
    fn key(&self) -> String {
        format!("{}.{}", self.plugin_id, self.method)
    }

    fn name(&self) -> String {
        if self.name.is_empty() {
            return self.key();
        }
        format!("{} / {}", self.name, self.method)
    }

    async fn schema_json(&self) -> String {
        let Some(running) = self.runtime.get_running(&self.category, &self.plugin_id) else {
            return String::new();
        };
        match running.core().get_config_schema(self.timeout).await {
            Ok(schema) => schema.json_schema,
            Err(e) => {
                tracing::debug!(provider = %self.key(), error = %e, "config schema unavailable");
                String::new()
            }
        }
    }

    async fn create_payment(&self, req: &PaymentCreate) -> Result<PaymentCreated, HangarError> {
        let client = self.client()?;
        let wire_req = CreatePaymentRequest {
            method: self.method.clone(),
            request: PaymentCreateRequest {
                order_no: req.order_no.clone(),
                user_id: req.user_id,
                amount: req.amount,
                currency: req.currency.clone(),
                subject: req.subject.clone(),
                return_url: req.return_url.clone(),
                notify_url: req.notify_url.clone(),
                extra: req.extra.clone(),
            },
        };
        let resp = client
            .create_payment(&wire_req, self.timeout)
            .await
            .map_err(map_unimplemented)?;
        let resp = ensure_ok(resp, "create payment failed")?;
        tracing::info!(provider = %self.key(), order_no = %req.order_no, trade_no = %resp.trade_no, "payment created");
        Ok(PaymentCreated {
            trade_no: resp.trade_no,
            pay_url: resp.pay_url,
            extra: resp.extra,
        })
    }

    async fn verify_notify(&self, req: &RawHttpRequest) -> Result<PaymentNotify, HangarError> {
        let client = self.client()?;
        let wire_req = VerifyNotifyRequest {
            method: self.method.clone(),
            raw: HttpRequest {
                method: req.method.clone(),
                path: req.path.clone(),
                raw_query: req.raw_query.clone(),
                headers: req.headers.clone(),
                body: req.body.clone(),
            },
        };
        let resp = client
            .verify_notify(&wire_req, self.timeout)
            .await
            .map_err(map_unimplemented)?;
        let resp = ensure_ok(resp, "verify notify failed")?;

        let raw = BTreeMap::from([
            ("order_no".to_string(), resp.order_no),
            ("raw_json".to_string(), resp.raw_json),
            ("status".to_string(), status_text(resp.status).to_string()),
        ]);
        Ok(PaymentNotify {
            trade_no: resp.trade_no,
            paid: resp.status == PaymentStatus::Paid,
            amount: resp.amount,
            raw,
            ack_body: resp.ack_body,
        })
    }

    async fn query_payment(&self, trade_no: &str) -> Result<PaymentQuery, HangarError> {
        let client = self.client()?;
        let wire_req = QueryPaymentRequest {
            method: self.method.clone(),
            trade_no: trade_no.trim().to_string(),
        };
        let resp = client
            .query_payment(&wire_req, self.timeout)
            .await
            .map_err(map_unimplemented)?;
        let resp = ensure_ok(resp, "query payment failed")?;
        Ok(PaymentQuery {
            trade_no: resp.trade_no,
            status: resp.status,
            amount: resp.amount,
        })
    }

    async fn refund(&self, req: &RefundCreate) -> Result<String, HangarError> {
        let client = self.client()?;
        let wire_req = RefundRequest {
            method: self.method.clone(),
            trade_no: req.trade_no.clone(),
            amount: req.amount,
            reason: req.reason.clone(),
        };
        let resp = client.refund(&wire_req, self.timeout).await.map_err(map_unimplemented)?;
        let resp = ensure_ok(resp, "refund failed")?;
        Ok(resp.refund_no)
    }
}

impl std::fmt::Debug for PluginPaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginPaymentProvider")
            .field("key", &self.key())
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn status_text(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Unspecified => "unspecified",
        PaymentStatus::Pending => "pending",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Failed => "failed",
        PaymentStatus::Refunding => "refunding",
        PaymentStatus::Refunded => "refunded",
        PaymentStatus::Closed => "closed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_runtime::RuntimeSettings;

    fn provider(name: &str) -> PluginPaymentProvider {
        let runtime = Arc::new(PluginRuntime::new("/nonexistent", RuntimeSettings::default()));
        PluginPaymentProvider::new(runtime, "payment", "ezpay", "payment-ezpay-1", "alipay", name)
    }

    #[test]
    fn key_and_name() {
        let p = provider("EZPay");
        assert_eq!(p.key(), "ezpay.alipay");
        assert_eq!(p.name(), "EZPay / alipay");
        assert_eq!(provider("  ").name(), "ezpay.alipay");
    }

    #[test]
    fn status_text_matches_wire_names() {
        for status in [PaymentStatus::Paid, PaymentStatus::Refunding, PaymentStatus::Unspecified] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status_text(status)));
        }
    }

    #[tokio::test]
    async fn stopped_plugin_fails_calls_and_has_no_schema() {
        let p = provider("EZPay");
        assert_eq!(p.schema_json().await, "");
        let err = p.create_payment(&PaymentCreate::default()).await.unwrap_err();
        assert_eq!(err, HangarError::NotRunning("payment:ezpay".into()));
    }
}
