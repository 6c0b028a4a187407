// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error translation shared by every adapter.

use hangar_core::HangarError;
use hangar_protocol::Outcome;
use hangar_protocol::rpc::codes;

/// Turn the plugin's "unimplemented" answer into `NotSupported`.
///
/// Every other error passes through untouched.
pub fn map_unimplemented(err: HangarError) -> HangarError {
    match err {
        HangarError::Rpc { code, message } if code == codes::UNIMPLEMENTED => {
            let message = message.trim();
            HangarError::NotSupported(if message.is_empty() {
                "not supported".to_string()
            } else {
                message.to_string()
            })
        }
        other => other,
    }
}

/// Surface a business-level not-ok answer as `Rejected`.
pub fn ensure_ok<T: Outcome>(resp: T, fallback: &str) -> Result<T, HangarError> {
    if resp.is_ok() {
        return Ok(resp);
    }
    let text = resp.error_text().trim();
    Err(HangarError::Rejected(if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }))
}
