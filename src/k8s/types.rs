use crate::labels::LabelSet;
use serde::{Deserialize, Serialize};

/// Merge-patch document touching only `metadata.labels` of a Node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePatch {
    pub metadata: NodePatchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePatchMetadata {
    pub labels: LabelSet,
}

impl NodePatch {
    pub fn labels(labels: LabelSet) -> Self {
        Self {
            metadata: NodePatchMetadata { labels },
        }
    }
}
