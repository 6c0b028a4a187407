// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business-facing adapters over running plugins.
//!
//! Each adapter resolves its plugin through [`hangar_runtime::PluginRuntime`]
//! on every call, bounds the RPC with a timeout, and normalizes two kinds of
//! plugin failure: an unimplemented method becomes
//! [`HangarError::NotSupported`](hangar_core::HangarError::NotSupported) and
//! a response with `ok == false` becomes
//! [`HangarError::Rejected`](hangar_core::HangarError::Rejected).

use std::time::Duration;

pub mod automation;
mod factory;
pub mod kyc;
pub mod monitor;
pub mod outcome;
pub mod payment;
pub mod registry;
pub mod sms;
mod target;

pub use automation::{
    AutomationAdapter, CreateHost, ElasticUpdate, FirewallRuleCreate, HostInfo, HostSimple, PortMappingCreate,
    RestorePoint,
};
pub use factory::Adapters;
pub use kyc::{KycAdapter, KycResult, KycStarted};
pub use monitor::{Monitor, parse_monitor};
pub use outcome::{ensure_ok, map_unimplemented};
pub use payment::{
    PaymentCreate, PaymentCreated, PaymentNotify, PaymentProvider, PaymentQuery, PluginPaymentProvider,
    RawHttpRequest, RefundCreate,
};
pub use registry::PaymentProviderRegistry;
pub use sms::{SmsAdapter, SmsMessage};

/// Default bound for automation, SMS and KYC calls.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(12);

/// Default bound for payment provider calls.
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(10);
