//! gRPC protocol definitions for the policy service
//!
//! Defines:
//! - `PolicyService` - container and host policy update RPCs
//! - `Policy` request and `Response` messages
//!
//! Generated from `proto/policy.proto`.

pub mod v1 {
    tonic::include_proto!("policy.v1");
}

pub use v1::policy_service_client::PolicyServiceClient;
pub use v1::policy_service_server::{PolicyService, PolicyServiceServer};
pub use v1::*;
