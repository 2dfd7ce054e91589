//! Container runtime selection
//!
//! Unlike the enforcer, a node without a container runtime cannot host the
//! platform, so failing to find one is an error.

use crate::config::normalize_runtime;
use crate::probe::{HostProbe, RuntimeInfo};
use crate::{Result, SnitchError};
use std::path::Path;
use tracing::{error, info};

pub fn resolve_runtime(
    probe: &dyn HostProbe,
    runtime_override: Option<&str>,
    path_prefix: &Path,
) -> Result<RuntimeInfo> {
    let preferred = runtime_override.and_then(normalize_runtime);

    match probe.detect_runtime(preferred.as_deref()) {
        Some(info) => {
            info!(
                "Detected {} as node runtime, runtime socket={}",
                info.runtime, info.socket
            );
            if let Some(nri) = &info.nri_socket {
                info!("NRI socket={}", nri);
            }
            Ok(info)
        }
        None => {
            error!("Not able to detect runtime");
            Err(SnitchError::RuntimeNotFound {
                path_prefix: path_prefix.display().to_string(),
            })
        }
    }
}
