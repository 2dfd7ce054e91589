//! Host capability probes
//!
//! [`HostProbe`] is the narrow interface the resolvers consume. [`FsProbe`]
//! answers each question by looking at the host filesystem mounted under a
//! path prefix.

pub mod host;
pub mod runtime;

pub use host::FsProbe;
pub use runtime::ContainerRuntime;

/// A discovered container runtime and its control sockets
///
/// Socket paths are host paths, without the probe's path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub runtime: ContainerRuntime,
    pub socket: String,
    pub nri_socket: Option<String>,
}

pub trait HostProbe {
    /// Whether the named LSM can be used for enforcement on this host
    fn lsm_usable(&self, lsm: &str) -> bool;

    fn apparmor_fs_present(&self) -> bool;

    fn security_fs_present(&self) -> bool;

    fn btf_supported(&self) -> bool;

    fn seccomp_profile_present(&self) -> bool;

    /// Look for a running container runtime, trying `preferred` first
    fn detect_runtime(&self, preferred: Option<&str>) -> Option<RuntimeInfo>;
}
