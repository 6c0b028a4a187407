// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host side of the handshake: read and check the plugin's first JSON line.

use std::time::Duration;

use hangar_core::HangarError;
use hangar_protocol::Handshake;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Wait up to `timeout` for the handshake line. Non-JSON chatter before it is skipped.
pub(crate) async fn read_handshake<R>(reader: &mut R, timeout: Duration) -> Result<Handshake, HangarError>
where
    R: AsyncBufRead + Unpin,
{
    let read = async {
        let mut line = String::new();
        loop {
            line.clear();
            let n = reader
                .read_line(&mut line)
                .await
                .map_err(|e| HangarError::Process(format!("reading handshake: {e}")))?;
            if n == 0 {
                return Err(HangarError::Process(
                    "plugin exited before completing the handshake".to_string(),
                ));
            }
            let trimmed = line.trim();
            if trimmed.starts_with('{') {
                return Handshake::parse(trimmed)
                    .map_err(|e| HangarError::Process(format!("handshake rejected: {e}")));
            }
            if !trimmed.is_empty() {
                tracing::debug!(line = trimmed, "skipping non-handshake output");
            }
        }
    };
    tokio::time::timeout(timeout, read)
        .await
        .map_err(|_| HangarError::Process(format!("no handshake within {timeout:?}")))?
}
