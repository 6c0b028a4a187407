// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire contract shared by the Hangar host and its plugin processes.
//!
//! A plugin is an executable speaking newline-delimited JSON-RPC 2.0 over
//! stdio. Before any RPC traffic the plugin prints one [`Handshake`] line;
//! afterwards every request names a `<service>.<Method>` pair, e.g.
//! `core.Init` or `payment.CreatePayment`.

pub mod automation;
pub mod handshake;
pub mod kyc;
pub mod lifecycle;
pub mod payment;
pub mod rpc;
pub mod sms;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use handshake::{Handshake, HandshakeError, MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE, PROTOCOL_VERSION};
pub use rpc::{ErrorObject, Request, Response};

/// One of the RPC service contracts a plugin may serve. `Core` is mandatory.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Core,
    Automation,
    Payment,
    Sms,
    Kyc,
}

impl Service {
    /// Full wire method name, e.g. `sms.Send`.
    pub fn method(self, name: &str) -> String {
        format!("{self}.{name}")
    }
}

/// Split `service.Method` into its parts. Unknown services yield `None`.
pub fn split_method(method: &str) -> Option<(Service, &str)> {
    let (service, name) = method.split_once('.')?;
    if name.is_empty() {
        return None;
    }
    service.parse().ok().map(|s| (s, name))
}

/// Business-level outcome carried by responses that can be rejected.
///
/// `ok == false` is a plugin decision, distinct from a transport or RPC failure.
pub trait Outcome {
    fn is_ok(&self) -> bool;
    fn error_text(&self) -> &str;
}

macro_rules! impl_outcome {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Outcome for $ty {
                fn is_ok(&self) -> bool {
                    self.ok
                }

                fn error_text(&self) -> &str {
                    &self.error
                }
            }
        )*
    };
}
pub(crate) use impl_outcome;
