//! Policy update service for hosts outside Kubernetes
//!
//! Responsibilities:
//! - Accept container and host policy events over gRPC
//! - Report whether a policy with the same name is already stored locally
//! - Hand each event to an injected [`PolicyHandler`]
//!
//! Deleting a policy that is already gone counts as success.

pub mod grpc_server;
pub mod handler;
pub mod policy_dir;

pub use grpc_server::{serve_with_listener, start_server, PolicyServer};
pub use handler::{PolicyHandler, PolicyKind};
pub use policy_dir::PolicyDir;
