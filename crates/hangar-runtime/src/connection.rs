// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multiplexed JSON-RPC over a plugin's stdio.
//!
//! Requests are written one per line to the child's stdin. A single reader
//! task owns stdout and routes each response to its waiter by id. When stdout
//! reaches EOF every outstanding call fails and the `closed` token fires.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hangar_core::HangarError;
use hangar_protocol::rpc::Request;
use hangar_protocol::{ErrorObject, Response, Service};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

type Reply = Result<Value, ErrorObject>;
type PendingMap = HashMap<u64, oneshot::Sender<Reply>>;

pub struct RpcConnection {
    label: String,
    services: Vec<Service>,
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: Arc<Mutex<PendingMap>>,
    next_id: AtomicU64,
    closed: CancellationToken,
    reader: JoinHandle<()>,
}

/// Removes the pending entry when a call finishes or is abandoned.
struct PendingGuard<'a> {
    pending: &'a Mutex<PendingMap>,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

impl RpcConnection {
    /// Wrap a negotiated stdio pair. Must be called inside a tokio runtime.
    pub fn new<W, R>(label: impl Into<String>, services: Vec<Service>, writer: W, reader: R) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        let label = label.into();
        let pending: Arc<Mutex<PendingMap>> = Arc::default();
        let closed = CancellationToken::new();
        let reader = tokio::spawn(read_loop(reader, pending.clone(), closed.clone(), label.clone()));
        Self {
            label,
            services,
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            closed,
            reader,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Fails unless the plugin announced `service` in its handshake.
    pub fn dispense(&self, service: Service) -> Result<(), HangarError> {
        if self.services.contains(&service) {
            Ok(())
        } else {
            Err(HangarError::Process(format!(
                "{} does not serve the {service} service",
                self.label
            )))
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Token cancelled once the plugin's stdout closes.
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Call `service.method` and decode the result.
    ///
    /// A `null` result decodes as an empty object so that unit-like
    /// responses deserialize into their defaults.
    pub async fn call<P, R>(
        &self,
        service: Service,
        method: &str,
        params: &P,
        timeout: Duration,
    ) -> Result<R, HangarError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let method = service.method(method);
        if self.is_closed() {
            return Err(HangarError::Transport(format!("{}: connection closed", self.label)));
        }

        let params = serde_json::to_value(params)
            .map_err(|e| HangarError::Internal(format!("encoding {method} params: {e}")))?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&Request::new(id, method.clone(), params))
            .map_err(|e| HangarError::Internal(format!("encoding {method}: {e}")))?;
        line.push('\n');

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        let _guard = PendingGuard {
            pending: &self.pending,
            id,
        };

        let exchange = async {
            self.write_line(&line).await?;
            match rx.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(HangarError::Rpc {
                    code: err.code,
                    message: err.message,
                }),
                Err(_) => Err(HangarError::Transport(format!(
                    "{}: connection closed during {method}",
                    self.label
                ))),
            }
        };

        let value = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(HangarError::Timeout {
                    operation: format!("{} {method}", self.label),
                    duration: timeout,
                });
            }
        };

        let value = if value.is_null() {
            Value::Object(Default::default())
        } else {
            value
        };
        serde_json::from_value(value)
            .map_err(|e| HangarError::Transport(format!("decoding {method} response: {e}")))
    }

    async fn write_line(&self, line: &str) -> Result<(), HangarError> {
        let mut writer = self.writer.lock().await;
        let io = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        };
        io.await
            .map_err(|e| HangarError::Transport(format!("{}: write failed: {e}", self.label)))
    }
}

impl Drop for RpcConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for RpcConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConnection")
            .field("label", &self.label)
            .field("services", &self.services)
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn read_loop<R>(mut reader: R, pending: Arc<Mutex<PendingMap>>, closed: CancellationToken, label: String)
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(plugin = %label, error = %e, "plugin stdout read failed");
                break;
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let response: Response = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(plugin = %label, error = %e, "ignoring non-RPC stdout line");
                continue;
            }
        };
        let waiter = pending.lock().remove(&response.id);
        match waiter {
            Some(tx) => {
                let _ = tx.send(response.into_result());
            }
            None => tracing::debug!(plugin = %label, id = response.id, "response for unknown request"),
        }
    }
    tracing::debug!(plugin = %label, "plugin stdout closed");
    pending.lock().clear();
    closed.cancel();
}
