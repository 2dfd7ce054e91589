//! Run configuration
//!
//! A [`SnitchConfig`] is assembled once at start-up from the command line and
//! handed by reference to every stage of the run.

use crate::{Result, SnitchError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LSM_ORDER: &str = "bpf,apparmor,selinux";
pub const DEFAULT_PATH_PREFIX: &str = "/rootfs";

// Both CRI-O and containerd read OCI hooks from the same directory by
// default. Until the runtime reports its own hook directory this is used for
// every runtime.
const DEFAULT_HOOK_DIR: &str = "/usr/share/containers/oci/hooks.d";
const DEFAULT_HOOK_FILE: &str = "ka.json";
const DEFAULT_PAYLOAD_DIR: &str = "/usr/share/kubearmor";
const DEFAULT_PAYLOAD_FILE: &str = "hook";
const DEFAULT_PAYLOAD_SOURCE: &str = "/hook";

const DEFAULT_SECCOMP_SOURCE: &str = "/seccomp/kubearmor-seccomp.json";
pub const SECCOMP_PROFILE_DIR: &str = "var/lib/kubelet/seccomp";
pub const SECCOMP_PROFILE_FILE: &str = "kubearmor-seccomp.json";

/// Where the OCI hook descriptor and its payload live on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPaths {
    pub hook_dir: PathBuf,
    pub hook_file: String,
    pub payload_dir: PathBuf,
    pub payload_file: String,
    pub payload_source: PathBuf,
}

impl HookPaths {
    pub fn descriptor_path(&self) -> PathBuf {
        self.hook_dir.join(&self.hook_file)
    }

    pub fn payload_path(&self) -> PathBuf {
        self.payload_dir.join(&self.payload_file)
    }
}

impl Default for HookPaths {
    fn default() -> Self {
        Self {
            hook_dir: PathBuf::from(DEFAULT_HOOK_DIR),
            hook_file: DEFAULT_HOOK_FILE.to_string(),
            payload_dir: PathBuf::from(DEFAULT_PAYLOAD_DIR),
            payload_file: DEFAULT_PAYLOAD_FILE.to_string(),
            payload_source: PathBuf::from(DEFAULT_PAYLOAD_SOURCE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnitchConfig {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub lsm_order: Vec<String>,
    pub node_name: String,
    pub path_prefix: PathBuf,
    pub runtime: Option<String>,
    pub oci_hooks: bool,
    pub log_level: String,
    pub hook_paths: HookPaths,
    pub seccomp_source: PathBuf,
}

impl SnitchConfig {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            kubeconfig: None,
            context: None,
            lsm_order: parse_lsm_order(DEFAULT_LSM_ORDER),
            node_name: node_name.into(),
            path_prefix: PathBuf::from(DEFAULT_PATH_PREFIX),
            runtime: None,
            oci_hooks: false,
            log_level: "info".to_string(),
            hook_paths: HookPaths::default(),
            seccomp_source: PathBuf::from(DEFAULT_SECCOMP_SOURCE),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_name.trim().is_empty() {
            return Err(SnitchError::ConfigError(
                "node name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Log filter for `log_level`, which accepts any `EnvFilter` directive
    pub fn log_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.log_level).map_err(|e| {
            SnitchError::ConfigError(format!(
                "unable to parse log level {}: {}",
                self.log_level, e
            ))
        })
    }

    /// Location of the kubelet seccomp profile directory on the host
    pub fn seccomp_profile_dir(&self) -> PathBuf {
        self.path_prefix.join(SECCOMP_PROFILE_DIR)
    }
}

/// Split a comma-separated LSM preference list
///
/// Entries are trimmed and lowercased; blank entries are dropped.
pub fn parse_lsm_order(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Reduce a runtime override such as `containerd://1.7.2` to its name
pub fn normalize_runtime(raw: &str) -> Option<String> {
    let name = raw.split("://").next().unwrap_or(raw).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}

/// Default kubeconfig location: `$HOME/.kube/config`, if it exists
pub fn default_kubeconfig() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    let path = Path::new(&home).join(".kube").join("config");
    path.exists().then_some(path)
}
