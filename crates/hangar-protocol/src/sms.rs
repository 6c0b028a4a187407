// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `sms` service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::impl_outcome;

pub const SEND: &str = "Send";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendSmsRequest {
    pub template_id: String,
    /// Free-form text for providers without templates.
    pub content: String,
    pub phones: Vec<String>,
    pub vars: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendSmsResponse {
    pub ok: bool,
    pub error: String,
    pub message_id: String,
}

impl_outcome!(SendSmsResponse);
