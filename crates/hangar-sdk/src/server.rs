// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plugin's side of the stdio protocol.

use std::sync::Arc;

use hangar_protocol::handshake::{MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE};
use hangar_protocol::rpc::{Request, codes};
use hangar_protocol::{ErrorObject, Handshake, Response, Service, split_method};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::service::{
    AutomationService, CoreService, KycService, PaymentService, SmsService, dispatch_automation, dispatch_core,
    dispatch_kyc, dispatch_payment, dispatch_sms,
};
use crate::status::{ServiceResult, Status};

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("this binary is a Hangar plugin and must be launched by the host")]
    MissingCookie,

    #[error("stdio failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding failure: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Builder for a plugin's RPC server.
///
/// ```no_run
/// # use hangar_sdk::{PluginServer, CoreService, SmsService};
/// # async fn run(core: impl CoreService, sms: impl SmsService) -> Result<(), hangar_sdk::ServeError> {
/// PluginServer::new(core).with_sms(sms).serve().await
/// # }
/// ```
pub struct PluginServer {
    core: Arc<dyn CoreService>,
    sms: Option<Arc<dyn SmsService>>,
    payment: Option<Arc<dyn PaymentService>>,
    kyc: Option<Arc<dyn KycService>>,
    automation: Option<Arc<dyn AutomationService>>,
}

impl PluginServer {
    pub fn new(core: impl CoreService) -> Self {
        Self {
            core: Arc::new(core),
            sms: None,
            payment: None,
            kyc: None,
            automation: None,
        }
    }

    pub fn with_sms(mut self, svc: impl SmsService) -> Self {
        self.sms = Some(Arc::new(svc));
        self
    }

    pub fn with_payment(mut self, svc: impl PaymentService) -> Self {
        self.payment = Some(Arc::new(svc));
        self
    }

    pub fn with_kyc(mut self, svc: impl KycService) -> Self {
        self.kyc = Some(Arc::new(svc));
        self
    }

    pub fn with_automation(mut self, svc: impl AutomationService) -> Self {
        self.automation = Some(Arc::new(svc));
        self
    }

    /// Services announced in the handshake, `core` first.
    pub fn services(&self) -> Vec<Service> {
        let mut services = vec![Service::Core];
        if self.automation.is_some() {
            services.push(Service::Automation);
        }
        if self.payment.is_some() {
            services.push(Service::Payment);
        }
        if self.sms.is_some() {
            services.push(Service::Sms);
        }
        if self.kyc.is_some() {
            services.push(Service::Kyc);
        }
        services
    }

    /// Serve over the process's stdin/stdout after checking the host cookie.
    pub async fn serve(self) -> Result<(), ServeError> {
        check_cookie(std::env::var(MAGIC_COOKIE_KEY).ok().as_deref())?;
        self.serve_io(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Write the handshake, then answer requests until `input` reaches EOF.
    ///
    /// Requests run concurrently; responses are written whole, one per line.
    pub async fn serve_io<R, W>(self, input: R, mut output: W) -> Result<(), ServeError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut line = serde_json::to_string(&Handshake::new(self.services()))?;
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(async move {
            while let Some(mut line) = rx.recv().await {
                line.push('\n');
                output.write_all(line.as_bytes()).await?;
                output.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let server = Arc::new(self);
        let mut tasks = JoinSet::new();
        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = server.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let response = server.handle_line(&line).await;
                match serde_json::to_string(&response) {
                    Ok(encoded) => {
                        let _ = tx.send(encoded);
                    }
                    Err(e) => tracing::error!(error = %e, "failed to encode response"),
                }
            });
            while tasks.try_join_next().is_some() {}
        }

        while tasks.join_next().await.is_some() {}
        drop(tx);
        match writer.await {
            Ok(result) => result?,
            Err(e) => return Err(ServeError::Io(std::io::Error::other(e))),
        }
        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Response {
        let request: Request = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => return Response::failure(0, ErrorObject::new(codes::PARSE_ERROR, e.to_string())),
        };
        let id = request.id;
        match self.route(&request.method, request.params).await {
            Ok(result) => Response::success(id, result),
            Err(status) => Response::failure(id, status.into()),
        }
    }

    async fn route(&self, method: &str, params: Value) -> ServiceResult<Value> {
        let Some((service, name)) = split_method(method) else {
            return Err(Status::unimplemented(format!("unknown method {method}")));
        };
        let not_served = || Status::unimplemented(format!("{service} is not served by this plugin"));
        match service {
            Service::Core => dispatch_core(self.core.as_ref(), name, params).await,
            Service::Sms => match &self.sms {
                Some(svc) => dispatch_sms(svc.as_ref(), name, params).await,
                None => Err(not_served()),
            },
            Service::Payment => match &self.payment {
                Some(svc) => dispatch_payment(svc.as_ref(), name, params).await,
                None => Err(not_served()),
            },
            Service::Kyc => match &self.kyc {
                Some(svc) => dispatch_kyc(svc.as_ref(), name, params).await,
                None => Err(not_served()),
            },
            Service::Automation => match &self.automation {
                Some(svc) => dispatch_automation(svc.as_ref(), name, params).await,
                None => Err(not_served()),
            },
        }
    }
}

/// A plugin refuses to run unless launched by a host that set the cookie.
pub fn check_cookie(value: Option<&str>) -> Result<(), ServeError> {
    match value {
        Some(v) if v == MAGIC_COOKIE_VALUE => Ok(()),
        _ => Err(ServeError::MissingCookie),
    }
}
