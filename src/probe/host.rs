//! Filesystem-backed host probe
//!
//! The snitch normally runs in a container with the host's root filesystem
//! mounted at a prefix such as `/rootfs`. Every check here resolves paths
//! under that prefix.

use super::runtime::{ContainerRuntime, DISCOVERY_ORDER, NRI_SOCKETS};
use super::{HostProbe, RuntimeInfo};
use crate::config::{SECCOMP_PROFILE_DIR, SECCOMP_PROFILE_FILE};
use std::fs;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SECURITYFS: &str = "sys/kernel/security";
const LSM_LIST: &str = "sys/kernel/security/lsm";
const APPARMOR_FS: &str = "sys/kernel/security/apparmor";
const SELINUX_FS: &str = "sys/fs/selinux";
const BTF_VMLINUX: &str = "sys/kernel/btf/vmlinux";

pub struct FsProbe {
    path_prefix: PathBuf,
}

impl FsProbe {
    pub fn new(path_prefix: impl Into<PathBuf>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
        }
    }

    /// Join a host path onto the prefix, treating absolute paths as relative
    fn host_path(&self, path: &str) -> PathBuf {
        self.path_prefix.join(path.trim_start_matches('/'))
    }

    /// Active LSMs as listed by securityfs, if the list is readable
    fn active_lsms(&self) -> Option<Vec<String>> {
        let path = self.host_path(LSM_LIST);
        match fs::read_to_string(&path) {
            Ok(content) => Some(
                content
                    .trim()
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            Err(e) => {
                debug!("Could not read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn find_socket(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|candidate| is_socket(&self.host_path(candidate)))
            .map(|candidate| candidate.to_string())
    }

    fn probe_runtime(&self, runtime: ContainerRuntime) -> Option<RuntimeInfo> {
        let socket = self.find_socket(runtime.sockets())?;
        let nri_socket = if runtime.supports_nri() {
            self.find_socket(&NRI_SOCKETS)
        } else {
            None
        };

        Some(RuntimeInfo {
            runtime,
            socket,
            nri_socket,
        })
    }
}

impl HostProbe for FsProbe {
    fn lsm_usable(&self, lsm: &str) -> bool {
        match self.active_lsms() {
            Some(active) => {
                let listed = active.iter().any(|l| l == lsm);
                match lsm {
                    "bpf" => listed && self.btf_supported(),
                    "apparmor" | "selinux" => listed,
                    _ => false,
                }
            }
            // Without the LSM list, fall back to each LSM's own filesystem.
            None => match lsm {
                "apparmor" => self.host_path(APPARMOR_FS).exists(),
                "selinux" => self.host_path(SELINUX_FS).exists(),
                _ => false,
            },
        }
    }

    fn apparmor_fs_present(&self) -> bool {
        self.host_path(APPARMOR_FS).exists()
    }

    fn security_fs_present(&self) -> bool {
        let path = self.host_path(SECURITYFS);
        match fs::read_dir(&path) {
            Ok(mut entries) => entries.next().is_some(),
            Err(e) => {
                debug!("securityfs not available at {}: {}", path.display(), e);
                false
            }
        }
    }

    fn btf_supported(&self) -> bool {
        let path = self.host_path(BTF_VMLINUX);
        if !path.exists() {
            debug!("BTF not found at {}", path.display());
            return false;
        }
        true
    }

    fn seccomp_profile_present(&self) -> bool {
        self.path_prefix
            .join(SECCOMP_PROFILE_DIR)
            .join(SECCOMP_PROFILE_FILE)
            .is_file()
    }

    fn detect_runtime(&self, preferred: Option<&str>) -> Option<RuntimeInfo> {
        if let Some(name) = preferred {
            match ContainerRuntime::from_name(name) {
                Some(runtime) => {
                    if let Some(info) = self.probe_runtime(runtime) {
                        return Some(info);
                    }
                    debug!("No socket found for preferred runtime {}", runtime);
                }
                None => warn!("Unknown runtime override {}, ignoring", name),
            }
        }

        DISCOVERY_ORDER
            .iter()
            .find_map(|runtime| self.probe_runtime(*runtime))
    }
}

fn is_socket(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.file_type().is_socket(),
        Err(_) => false,
    }
}
