//! gRPC server implementation for policy updates
//!
//! Implements `PolicyService`. Malformed events never surface as transport
//! errors: they are logged and answered with `status = 0`.

use crate::handler::{PolicyHandler, PolicyKind};
use crate::policy_dir::PolicyDir;
use anyhow::{Context, Result};
use log::{error, info, warn};
use snitch_common::PolicyEvent;
use snitch_proto::{Policy, PolicyService, PolicyServiceServer, Response as PolicyResponse};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

const STATUS_FAILED: i32 = 0;
const STATUS_OK: i32 = 1;

/// gRPC service implementation
pub struct PolicyServer<H> {
    handler: H,
    policies: PolicyDir,
}

impl<H: PolicyHandler> PolicyServer<H> {
    pub fn new(handler: H, policies: PolicyDir) -> Self {
        Self { handler, policies }
    }

    /// Decode one event, consult the policy directory and the handler
    pub fn handle(&self, kind: PolicyKind, payload: &[u8]) -> PolicyResponse {
        let mut res = PolicyResponse {
            status: STATUS_FAILED,
            ..Default::default()
        };

        let event: PolicyEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("Invalid {} Policy Event: {}", kind, e);
                return res;
            }
        };

        if event.name().is_empty() {
            warn!("Empty {} Policy Event", kind);
            return res;
        }

        res.present = self.policies.contains(event.name());
        res.applied = kind.apply(&self.handler, &event);

        // Deleting a policy that is already gone is not an error.
        res.status = if res.applied || event.is_delete() {
            STATUS_OK
        } else {
            STATUS_FAILED
        };

        res
    }
}

#[tonic::async_trait]
impl<H: PolicyHandler> PolicyService for PolicyServer<H> {
    async fn container_policy(
        &self,
        request: Request<Policy>,
    ) -> Result<Response<PolicyResponse>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.handle(PolicyKind::Container, &req.policy)))
    }

    async fn host_policy(
        &self,
        request: Request<Policy>,
    ) -> Result<Response<PolicyResponse>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.handle(PolicyKind::Host, &req.policy)))
    }
}

/// Start the gRPC server on `addr` in the background
///
/// Returns the bound address, which differs from `addr` when port 0 was
/// requested.
pub async fn start_server<H: PolicyHandler>(
    service: PolicyServer<H>,
    addr: SocketAddr,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind policy service to {}", addr))?;
    let bound = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve_with_listener(service, listener).await {
            error!("gRPC server error: {}", e);
        }
    });

    Ok((bound, handle))
}

/// Serve the policy service on an already bound listener until it fails
pub async fn serve_with_listener<H: PolicyHandler>(
    service: PolicyServer<H>,
    listener: TcpListener,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Starting policy gRPC server on {}", addr);

    tonic::transport::Server::builder()
        .add_service(PolicyServiceServer::new(service))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
        .context("Policy gRPC server failed")
}
