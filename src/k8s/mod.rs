pub mod client;
pub mod publisher;
pub mod types;

pub use client::K8sClient;
pub use publisher::{NodePatcher, NodePublisher};
pub use types::NodePatch;
