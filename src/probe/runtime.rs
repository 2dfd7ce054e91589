//! Known container runtimes and where their control sockets live

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRuntime {
    Containerd,
    CriO,
    Docker,
}

/// Discovery order when no runtime override is given
pub const DISCOVERY_ORDER: [ContainerRuntime; 3] = [
    ContainerRuntime::Containerd,
    ContainerRuntime::CriO,
    ContainerRuntime::Docker,
];

/// NRI sockets, published alongside containerd and CRI-O
pub const NRI_SOCKETS: [&str; 2] = ["/var/run/nri/nri.sock", "/run/nri/nri.sock"];

impl ContainerRuntime {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContainerRuntime::Containerd => "containerd",
            ContainerRuntime::CriO => "cri-o",
            ContainerRuntime::Docker => "docker",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "containerd" => Some(ContainerRuntime::Containerd),
            "cri-o" | "crio" => Some(ContainerRuntime::CriO),
            "docker" => Some(ContainerRuntime::Docker),
            _ => None,
        }
    }

    /// Candidate control sockets, most specific distribution layouts first
    pub const fn sockets(&self) -> &'static [&'static str] {
        match self {
            ContainerRuntime::Containerd => &[
                "/var/snap/microk8s/common/run/containerd.sock",
                "/run/k0s/containerd.sock",
                "/run/k3s/containerd/containerd.sock",
                "/run/containerd/containerd.sock",
                "/var/run/containerd/containerd.sock",
            ],
            ContainerRuntime::CriO => &["/var/run/crio/crio.sock", "/run/crio/crio.sock"],
            ContainerRuntime::Docker => &["/var/run/docker.sock", "/run/docker.sock"],
        }
    }

    pub const fn supports_nri(&self) -> bool {
        matches!(self, ContainerRuntime::Containerd | ContainerRuntime::CriO)
    }

    /// The address the OCI hook uses to reach this runtime
    ///
    /// CRI-O's socket has to be given as a `unix://` URI; other runtimes take
    /// the raw path.
    pub fn hook_socket_address(&self, socket: &str) -> String {
        match self {
            ContainerRuntime::CriO => format!("unix://{}", socket),
            _ => socket.to_string(),
        }
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            ContainerRuntime::from_name("containerd"),
            Some(ContainerRuntime::Containerd)
        );
        assert_eq!(ContainerRuntime::from_name("CRIO"), Some(ContainerRuntime::CriO));
        assert_eq!(ContainerRuntime::from_name("rkt"), None);
    }

    #[test]
    fn test_hook_socket_address() {
        assert_eq!(
            ContainerRuntime::CriO.hook_socket_address("/var/run/crio/crio.sock"),
            "unix:///var/run/crio/crio.sock"
        );
        assert_eq!(
            ContainerRuntime::Containerd.hook_socket_address("/run/containerd/containerd.sock"),
            "/run/containerd/containerd.sock"
        );
    }

    #[test]
    fn test_nri_support() {
        assert!(ContainerRuntime::Containerd.supports_nri());
        assert!(ContainerRuntime::CriO.supports_nri());
        assert!(!ContainerRuntime::Docker.supports_nri());
    }
}
