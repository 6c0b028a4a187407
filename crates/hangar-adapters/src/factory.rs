// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use hangar_core::InstallationStore;
use hangar_runtime::PluginRuntime;

use crate::automation::AutomationAdapter;
use crate::kyc::KycAdapter;
use crate::registry::PaymentProviderRegistry;
use crate::sms::SmsAdapter;
use crate::{DEFAULT_CALL_TIMEOUT, DEFAULT_PAYMENT_TIMEOUT};

/// Builds adapters that share one runtime and one set of call bounds.
#[derive(Clone)]
pub struct Adapters {
    runtime: Arc<PluginRuntime>,
    call_timeout: Duration,
    payment_timeout: Duration,
}

impl Adapters {
    pub fn new(runtime: Arc<PluginRuntime>) -> Self {
        Self {
            runtime,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }

    /// Bound for automation, SMS and KYC calls.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }

    pub fn sms(&self, plugin_id: &str, instance_id: &str) -> SmsAdapter {
        SmsAdapter::new(self.runtime.clone(), plugin_id, instance_id).with_timeout(self.call_timeout)
    }

    pub fn kyc(&self, plugin_id: &str, instance_id: &str) -> KycAdapter {
        KycAdapter::new(self.runtime.clone(), plugin_id, instance_id).with_timeout(self.call_timeout)
    }

    pub fn automation(&self, plugin_id: &str, instance_id: &str) -> AutomationAdapter {
        AutomationAdapter::new(self.runtime.clone(), plugin_id, instance_id).with_timeout(self.call_timeout)
    }

    pub fn payment_registry(&self, installations: Arc<dyn InstallationStore>) -> PaymentProviderRegistry {
        PaymentProviderRegistry::new(installations, self.runtime.clone()).with_timeout(self.payment_timeout)
    }
}
