//! Types shared between the node snitch and the policy service
//!
//! This crate defines:
//! - The fixed vocabulary of node label keys the snitch is allowed to publish
//! - The string values those labels take ("yes", "no", "none")
//! - The JSON policy event documents accepted by the policy gRPC service

use serde::{Deserialize, Serialize};

/// Node label keys
///
/// Every label the snitch publishes must use one of these keys. The list is
/// closed: facts without a key here are never written to the node.
pub mod labels {
    pub const ENFORCER: &str = "kubearmor.io/enforcer";
    pub const RUNTIME: &str = "kubearmor.io/runtime";
    pub const SOCKET: &str = "kubearmor.io/socket";
    pub const NRI_SOCKET: &str = "kubearmor.io/nri-socket";
    pub const RAND: &str = "kubearmor.io/rand";
    pub const BTF: &str = "kubearmor.io/btf";
    pub const APPARMOR_FS: &str = "kubearmor.io/apparmorfs";
    pub const SECURITY_FS: &str = "kubearmor.io/securityfs";
    pub const SECCOMP: &str = "kubearmor.io/seccomp";
    pub const OCI_HOOKS: &str = "kubearmor.io/oci-hooks";

    /// All registered keys, in publication order
    pub const ALL: [&str; 10] = [
        ENFORCER,
        RUNTIME,
        SOCKET,
        NRI_SOCKET,
        RAND,
        BTF,
        APPARMOR_FS,
        SECURITY_FS,
        SECCOMP,
        OCI_HOOKS,
    ];

    /// Check whether a key belongs to the registered vocabulary
    pub fn is_registered(key: &str) -> bool {
        ALL.contains(&key)
    }
}

/// Label values
pub mod values {
    pub const YES: &str = "yes";
    pub const NO: &str = "no";
    pub const NONE: &str = "none";

    pub const fn yes_no(flag: bool) -> &'static str {
        if flag {
            YES
        } else {
            NO
        }
    }
}

/// Event type carried by a deletion event
pub const EVENT_DELETED: &str = "DELETED";

/// Object metadata of a policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A security policy object as delivered inside an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyObject {
    #[serde(default)]
    pub metadata: PolicyMetadata,
    #[serde(default)]
    pub spec: serde_json::Value,
}

/// A policy event: ADDED, MODIFIED or DELETED plus the affected object
///
/// Container policies and host policies share this shape; the RPC on which
/// the event arrives decides which handler receives it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub object: PolicyObject,
}

impl PolicyEvent {
    pub fn name(&self) -> &str {
        &self.object.metadata.name
    }

    pub fn is_delete(&self) -> bool {
        self.event_type == EVENT_DELETED
    }
}
