use crate::k8s::publisher::NodePatcher;
use crate::{Result, SnitchError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::path::Path;
use tracing::{debug, info};

pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    pub async fn try_default() -> Result<Self> {
        debug!("Initializing Kubernetes client");

        let client = Client::try_default().await.map_err(|e| {
            SnitchError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(Self { client })
    }

    /// Build a client from an explicit kubeconfig file and context, falling
    /// back to the in-cluster/default chain when neither is given
    pub async fn from_kubeconfig(path: Option<&Path>, context: Option<&str>) -> Result<Self> {
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };

        let config = match path {
            Some(path) => {
                debug!("Initializing Kubernetes client from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    SnitchError::KubernetesError(format!(
                        "Failed to read kubeconfig {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| {
                        SnitchError::KubernetesError(format!(
                            "Invalid kubeconfig {}: {}",
                            path.display(),
                            e
                        ))
                    })?
            }
            None if context.is_some() => Config::from_kubeconfig(&options).await.map_err(|e| {
                SnitchError::KubernetesError(format!("Failed to load kubeconfig context: {}", e))
            })?,
            None => return Self::try_default().await,
        };

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        let client = Client::try_from(config).map_err(|e| {
            SnitchError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(Self { client })
    }

    pub fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl NodePatcher for K8sClient {
    async fn merge_patch(&self, node: &str, patch: &serde_json::Value) -> Result<()> {
        self.nodes()
            .patch(node, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map(|_| ())
            .map_err(|e| SnitchError::PatchFailed {
                node: node.to_string(),
                message: e.to_string(),
            })
    }
}
