// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RPC failure values returned by service implementations.

use hangar_protocol::ErrorObject;
use hangar_protocol::rpc::codes;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status {code}: {message}")]
pub struct Status {
    pub code: i64,
    pub message: String,
}

pub type ServiceResult<T> = Result<T, Status>;

impl Status {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The host maps this code to `NotSupported`.
    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(codes::UNIMPLEMENTED, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }
}

impl From<Status> for ErrorObject {
    fn from(status: Status) -> Self {
        ErrorObject::new(status.code, status.message)
    }
}
