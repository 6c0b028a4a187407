// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use hangar_core::{HangarError, category};
use hangar_protocol::sms::SendSmsRequest;
use hangar_runtime::{PluginRuntime, SmsClient};

use crate::DEFAULT_CALL_TIMEOUT;
use crate::outcome::{ensure_ok, map_unimplemented};
use crate::target::running_instance;

/// An outbound text message. Either `template_id` or `content` is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsMessage {
    pub template_id: String,
    pub content: String,
    pub phones: Vec<String>,
    pub vars: BTreeMap<String, String>,
}

/// Sends text messages through a running SMS plugin.
#[derive(Clone)]
pub struct SmsAdapter {
    runtime: Arc<PluginRuntime>,
    plugin_id: String,
    instance_id: String,
    timeout: Duration,
}

impl SmsAdapter {
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

    fn client(&self) -> Result<SmsClient, HangarError> {
        running_instance(&self.runtime, category::SMS, &self.plugin_id, &self.instance_id)?.sms()
    }

    /// Send `message`, returning the provider's message id.
    pub async fn send(&self, message: &SmsMessage) -> Result<String, HangarError> {
        let client = self.client()?;
        let req = SendSmsRequest {
            template_id: message.template_id.clone(),
            content: message.content.clone(),
            phones: message.phones.clone(),
            vars: message.vars.clone(),
        };
        let resp = client.send(&req, self.timeout).await.map_err(map_unimplemented)?;
        let resp = ensure_ok(resp, "send sms failed")?;
        tracing::debug!(plugin = %self.plugin_id, message_id = %resp.message_id, "sms sent");
        Ok(resp.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_runtime::RuntimeSettings;

    #[tokio::test]
    async fn send_without_a_running_plugin_is_not_running() {
        let runtime = Arc::new(PluginRuntime::new("/nonexistent", RuntimeSettings::default()));
        let adapter = SmsAdapter::new(runtime, "alisms", "sms-alisms-1");
        let err = adapter.send(&SmsMessage::default()).await.unwrap_err();
        assert_eq!(err, HangarError::NotRunning("sms:alisms".into()));
    }
}
