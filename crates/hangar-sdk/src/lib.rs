// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building blocks for Hangar plugin executables.
//!
//! A plugin implements [`CoreService`] plus any optional service traits,
//! registers them on a [`PluginServer`] and calls [`PluginServer::serve`]
//! from `main`.

pub mod payment_status;
mod server;
mod service;
mod status;

pub use hangar_protocol as protocol;
pub use server::{PluginServer, ServeError, check_cookie};
pub use service::{AutomationService, CoreService, KycService, PaymentService, SmsService};
pub use status::{ServiceResult, Status};
