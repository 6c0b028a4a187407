// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use hangar_core::{HangarError, category};
use hangar_protocol::kyc::{KycQueryRequest, KycStartRequest};
use hangar_runtime::{KycClient, PluginRuntime};
use serde::Serialize;

use crate::DEFAULT_CALL_TIMEOUT;
use crate::outcome::{ensure_ok, map_unimplemented};
use crate::target::running_instance;

/// A verification session opened with the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KycStarted {
    pub token: String,
    pub url: String,
    pub next_step: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KycResult {
    pub status: String,
    pub reason: String,
    pub raw_json: String,
}

/// Identity verification through a running KYC plugin.
#[derive(Clone)]
pub struct KycAdapter {
    runtime: Arc<PluginRuntime>,
    plugin_id: String,
    instance_id: String,
    timeout: Duration,
}

impl KycAdapter {
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

    fn client(&self) -> Result<KycClient, HangarError> {
        running_instance(&self.runtime, category::KYC, &self.plugin_id, &self.instance_id)?.kyc()
    }

    pub async fn start(&self, user_id: i64, params: BTreeMap<String, String>) -> Result<KycStarted, HangarError> {
        let client = self.client()?;
        let req = KycStartRequest { user_id, params };
        let resp = client.start(&req, self.timeout).await.map_err(map_unimplemented)?;
        let resp = ensure_ok(resp, "kyc start failed")?;
        Ok(KycStarted {
            token: resp.token,
            url: resp.url,
            next_step: resp.next_step,
        })
    }

    pub async fn query_result(&self, token: &str) -> Result<KycResult, HangarError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(HangarError::InvalidInput("kyc token is required".to_string()));
        }
        let client = self.client()?;
        let req = KycQueryRequest {
            token: token.to_string(),
        };
        let resp = client.query_result(&req, self.timeout).await.map_err(map_unimplemented)?;
        let resp = ensure_ok(resp, "kyc query failed")?;
        Ok(KycResult {
            status: resp.status,
            reason: resp.reason,
            raw_json: resp.raw_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_runtime::RuntimeSettings;

    fn adapter() -> KycAdapter {
        let runtime = Arc::new(PluginRuntime::new("/nonexistent", RuntimeSettings::default()));
        KycAdapter::new(runtime, "tencent", "kyc-tencent-1")
    }

    #[tokio::test]
    async fn blank_token_is_rejected_before_lookup() {
        let err = adapter().query_result("  ").await.unwrap_err();
        assert!(matches!(err, HangarError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn start_requires_a_running_plugin() {
        let err = adapter().start(7, BTreeMap::new()).await.unwrap_err();
        assert_eq!(err, HangarError::NotRunning("kyc:tencent".into()));
    }
}
