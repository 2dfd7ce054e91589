use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnitchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Kubernetes error: {0}")]
    KubernetesError(String),

    #[error("No container runtime found under {path_prefix}")]
    RuntimeNotFound { path_prefix: String },

    #[error("Failed to serialize node patch: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to patch node {node}: {message}")]
    PatchFailed { node: String, message: String },

    #[error("OCI hook installation failed: {0}")]
    HookError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SnitchError>;
