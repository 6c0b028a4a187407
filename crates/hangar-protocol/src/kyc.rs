// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `kyc` (identity verification) service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::impl_outcome;

pub const START: &str = "Start";
pub const QUERY_RESULT: &str = "QueryResult";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KycStartRequest {
    pub user_id: i64,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KycStartResponse {
    pub ok: bool,
    pub error: String,
    /// Verification session token, passed back to `QueryResult`.
    pub token: String,
    pub url: String,
    pub next_step: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KycQueryRequest {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KycQueryResponse {
    pub ok: bool,
    pub error: String,
    pub status: String,
    pub reason: String,
    pub raw_json: String,
}

impl_outcome!(KycStartResponse, KycQueryResponse);
