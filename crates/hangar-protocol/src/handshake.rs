// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-RPC negotiation between host and plugin.
//!
//! The host exports the magic cookie and protocol version into the child's
//! environment. The plugin refuses to run without the cookie, then prints a
//! single JSON [`Handshake`] line naming the services it serves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Service;

pub const PROTOCOL_VERSION: u32 = 1;

/// Environment variable carrying the shared cookie.
pub const MAGIC_COOKIE_KEY: &str = "HANGAR_PLUGIN_MAGIC_COOKIE";

pub const MAGIC_COOKIE_VALUE: &str = "5b0f2a1c-hangar-plugin";

/// Environment variable carrying the host's protocol version.
pub const PROTOCOL_VERSION_ENV: &str = "HANGAR_PLUGIN_PROTOCOL_VERSION";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("protocol version mismatch: host speaks {expected}, plugin speaks {got}")]
    ProtocolVersion { expected: u32, got: u32 },

    #[error("magic cookie mismatch")]
    MagicCookie,

    #[error("plugin does not serve the core service")]
    MissingCore,

    #[error("malformed handshake: {0}")]
    Malformed(String),
}

/// The first line a plugin writes to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    pub protocol_version: u32,
    pub magic_cookie_key: String,
    pub magic_cookie_value: String,
    pub services: Vec<Service>,
}

impl Handshake {
    pub fn new(services: Vec<Service>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            magic_cookie_key: MAGIC_COOKIE_KEY.to_string(),
            magic_cookie_value: MAGIC_COOKIE_VALUE.to_string(),
            services,
        }
    }

    /// Parse and check a handshake line as the host receives it.
    pub fn parse(line: &str) -> Result<Self, HandshakeError> {
        let handshake: Handshake = serde_json::from_str(line.trim())
            .map_err(|e| HandshakeError::Malformed(e.to_string()))?;
        handshake.validate()?;
        Ok(handshake)
    }

    pub fn validate(&self) -> Result<(), HandshakeError> {
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(HandshakeError::ProtocolVersion {
                expected: PROTOCOL_VERSION,
                got: self.protocol_version,
            });
        }
        if self.magic_cookie_key != MAGIC_COOKIE_KEY || self.magic_cookie_value != MAGIC_COOKIE_VALUE {
            return Err(HandshakeError::MagicCookie);
        }
        if !self.services.contains(&Service::Core) {
            return Err(HandshakeError::MissingCore);
        }
        Ok(())
    }

    pub fn serves(&self, service: Service) -> bool {
        self.services.contains(&service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_handshake_parses() {
        let line = serde_json::to_string(&Handshake::new(vec![Service::Core, Service::Sms])).unwrap();
        let hs = Handshake::parse(&line).unwrap();
        assert!(hs.serves(Service::Sms));
        assert!(!hs.serves(Service::Payment));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut hs = Handshake::new(vec![Service::Core]);
        hs.protocol_version = 2;
        let line = serde_json::to_string(&hs).unwrap();
        assert_eq!(
            Handshake::parse(&line),
            Err(HandshakeError::ProtocolVersion { expected: 1, got: 2 })
        );
    }

    #[test]
    fn cookie_mismatch_is_rejected() {
        let mut hs = Handshake::new(vec![Service::Core]);
        hs.magic_cookie_value = "wrong".into();
        assert_eq!(hs.validate(), Err(HandshakeError::MagicCookie));
    }

    #[test]
    fn core_is_mandatory() {
        let hs = Handshake::new(vec![Service::Sms]);
        assert_eq!(hs.validate(), Err(HandshakeError::MissingCore));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            Handshake::parse("hello from plugin"),
            Err(HandshakeError::Malformed(_))
        ));
    }
}
