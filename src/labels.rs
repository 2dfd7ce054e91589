//! Node label composition
//!
//! Turns the run's decisions into the flat label map published on the node.
//! Composition is pure; everything host-dependent, including the random
//! suffix, is gathered beforehand into [`HostCapabilities`].

use crate::hook::HookOutcome;
use crate::probe::{HostProbe, RuntimeInfo};
use crate::resolve::Enforcer;
use rand::Rng;
use snitch_common::{labels, values};
use std::collections::BTreeMap;
use tracing::info;

pub type LabelSet = BTreeMap<String, String>;

/// Same alphabet Kubernetes uses for generated name suffixes
const RAND_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const RAND_LEN: usize = 4;

/// Host facts gathered independently of enforcer and runtime selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCapabilities {
    pub btf: bool,
    pub seccomp_profile: bool,
    pub apparmor_fs: bool,
    pub security_fs: bool,
    pub rand: String,
}

impl HostCapabilities {
    pub fn gather(probe: &dyn HostProbe) -> Self {
        let btf = probe.btf_supported();
        info!("Kernel has BTF: {}", values::yes_no(btf));

        Self {
            btf,
            seccomp_profile: probe.seccomp_profile_present(),
            apparmor_fs: probe.apparmor_fs_present(),
            security_fs: probe.security_fs_present(),
            rand: random_suffix(),
        }
    }
}

pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..RAND_LEN)
        .map(|_| RAND_ALPHABET[rng.gen_range(0..RAND_ALPHABET.len())] as char)
        .collect()
}

/// Make a socket path usable as a label value
///
/// `/run/containerd/containerd.sock` becomes `run_containerd_containerd.sock`.
pub fn socket_label_value(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).replace('/', "_")
}

pub fn compose_labels(
    enforcer: &Enforcer,
    runtime: &RuntimeInfo,
    caps: &HostCapabilities,
    hook: &HookOutcome,
) -> LabelSet {
    let mut set = LabelSet::new();
    let mut put = |key: &str, value: String| {
        set.insert(key.to_string(), value);
    };

    put(labels::ENFORCER, enforcer.as_str().to_string());
    put(labels::RUNTIME, runtime.runtime.as_str().to_string());
    put(labels::SOCKET, socket_label_value(&runtime.socket));
    if let Some(nri) = runtime.nri_socket.as_deref().filter(|s| !s.is_empty()) {
        put(labels::NRI_SOCKET, socket_label_value(nri));
    }
    put(labels::RAND, caps.rand.clone());
    put(labels::BTF, values::yes_no(caps.btf).to_string());
    put(labels::APPARMOR_FS, values::yes_no(caps.apparmor_fs).to_string());
    put(labels::SECCOMP, values::yes_no(caps.seccomp_profile).to_string());
    put(labels::OCI_HOOKS, hook.label_value().to_string());

    let security_fs = !enforcer.is_none() && caps.security_fs;
    put(labels::SECURITY_FS, values::yes_no(security_fs).to_string());

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ContainerRuntime;

    fn containerd(nri: Option<&str>) -> RuntimeInfo {
        RuntimeInfo {
            runtime: ContainerRuntime::Containerd,
            socket: "/run/containerd/containerd.sock".to_string(),
            nri_socket: nri.map(str::to_string),
        }
    }

    fn caps() -> HostCapabilities {
        HostCapabilities {
            btf: true,
            seccomp_profile: false,
            apparmor_fs: true,
            security_fs: true,
            rand: "x7kq".to_string(),
        }
    }

    #[test]
    fn test_socket_label_value() {
        assert_eq!(
            socket_label_value("/run/containerd/containerd.sock"),
            "run_containerd_containerd.sock"
        );
        assert_eq!(socket_label_value("//double"), "_double");
        assert_eq!(socket_label_value("relative/path"), "relative_path");
    }

    #[test]
    fn test_compose_full_set() {
        let set = compose_labels(
            &Enforcer::Lsm("apparmor".to_string()),
            &containerd(Some("/run/nri/nri.sock")),
            &caps(),
            &HookOutcome::installed(),
        );

        assert_eq!(set[labels::ENFORCER], "apparmor");
        assert_eq!(set[labels::RUNTIME], "containerd");
        assert_eq!(set[labels::SOCKET], "run_containerd_containerd.sock");
        assert_eq!(set[labels::NRI_SOCKET], "run_nri_nri.sock");
        assert_eq!(set[labels::RAND], "x7kq");
        assert_eq!(set[labels::BTF], "yes");
        assert_eq!(set[labels::APPARMOR_FS], "yes");
        assert_eq!(set[labels::SECCOMP], "no");
        assert_eq!(set[labels::OCI_HOOKS], "yes");
        assert_eq!(set[labels::SECURITY_FS], "yes");
        assert_eq!(set.len(), labels::ALL.len());
    }

    #[test]
    fn test_no_enforcer_means_no_securityfs() {
        let set = compose_labels(&Enforcer::None, &containerd(None), &caps(), &HookOutcome::skipped());

        assert_eq!(set[labels::ENFORCER], "none");
        assert_eq!(set[labels::SECURITY_FS], "no");
        assert_eq!(set[labels::OCI_HOOKS], "no");
        assert!(!set.contains_key(labels::NRI_SOCKET));
    }

    #[test]
    fn test_only_registered_keys() {
        let set = compose_labels(&Enforcer::None, &containerd(None), &caps(), &HookOutcome::failed());
        assert!(set.keys().all(|k| labels::is_registered(k)));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let enforcer = Enforcer::Lsm("bpf".to_string());
        let runtime = containerd(None);
        let a = compose_labels(&enforcer, &runtime, &caps(), &HookOutcome::failed());
        let b = compose_labels(&enforcer, &runtime, &caps(), &HookOutcome::failed());
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_suffix() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.bytes().all(|b| RAND_ALPHABET.contains(&b)));
    }
}
