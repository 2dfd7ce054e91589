//! Node label publication
//!
//! The label set is written with a single merge patch against the Node
//! object. Labels not in the set are left alone. A failed patch fails the
//! run without retrying; the scheduler re-runs the whole snitch.

use crate::k8s::types::NodePatch;
use crate::labels::LabelSet;
use crate::Result;
use async_trait::async_trait;
use tracing::info;

/// Applies a JSON merge patch to a named Node
#[async_trait]
pub trait NodePatcher: Send + Sync {
    async fn merge_patch(&self, node: &str, patch: &serde_json::Value) -> Result<()>;
}

pub struct NodePublisher<'a> {
    patcher: &'a dyn NodePatcher,
}

impl<'a> NodePublisher<'a> {
    pub fn new(patcher: &'a dyn NodePatcher) -> Self {
        Self { patcher }
    }

    /// Publish `labels` on `node`, returning the patch that was applied
    pub async fn publish(&self, node: &str, labels: &LabelSet) -> Result<serde_json::Value> {
        let patch = serde_json::to_value(NodePatch::labels(labels.clone()))?;

        self.patcher.merge_patch(node, &patch).await?;

        info!("Patched node {}, patch={}", node, patch);
        Ok(patch)
    }
}
