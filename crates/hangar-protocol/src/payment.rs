// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `payment` service. Amounts are integer minor units.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::impl_outcome;

pub const LIST_METHODS: &str = "ListMethods";
pub const CREATE_PAYMENT: &str = "CreatePayment";
pub const QUERY_PAYMENT: &str = "QueryPayment";
pub const REFUND: &str = "Refund";
pub const VERIFY_NOTIFY: &str = "VerifyNotify";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unspecified,
    Pending,
    Paid,
    Failed,
    Refunding,
    Refunded,
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListMethodsResponse {
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentCreateRequest {
    pub order_no: String,
    pub user_id: i64,
    pub amount: i64,
    pub currency: String,
    pub subject: String,
    pub return_url: String,
    pub notify_url: String,
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePaymentRequest {
    pub method: String,
    pub request: PaymentCreateRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePaymentResponse {
    pub ok: bool,
    pub error: String,
    pub trade_no: String,
    pub pay_url: String,
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPaymentRequest {
    pub method: String,
    pub trade_no: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPaymentResponse {
    pub ok: bool,
    pub error: String,
    pub status: PaymentStatus,
    pub amount: i64,
    pub trade_no: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefundRequest {
    pub method: String,
    pub trade_no: String,
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefundResponse {
    pub ok: bool,
    pub error: String,
    pub refund_no: String,
}

/// An inbound gateway callback, forwarded as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub raw_query: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyNotifyRequest {
    pub method: String,
    pub raw: HttpRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyVerifyResult {
    pub ok: bool,
    pub error: String,
    pub order_no: String,
    pub trade_no: String,
    pub amount: i64,
    pub status: PaymentStatus,
    pub raw_json: String,
    /// Body the host must answer the gateway with.
    pub ack_body: String,
}

impl_outcome!(
    CreatePaymentResponse,
    QueryPaymentResponse,
    RefundResponse,
    NotifyVerifyResult
);
