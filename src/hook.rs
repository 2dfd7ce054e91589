//! OCI hook installation
//!
//! Registers a lifecycle hook with the container runtime: a JSON descriptor in
//! the runtime's hook directory plus the executable it points to. Each write
//! is idempotent, so a run that failed halfway is repaired by the next one.

use crate::config::HookPaths;
use crate::probe::RuntimeInfo;
use crate::{Result, SnitchError};
use serde::{Deserialize, Serialize};
use snitch_common::values;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;
use tracing::{debug, error, info};

pub const HOOK_VERSION: &str = "1.0.0";
pub const STAGE_CREATE_RUNTIME: &str = "createRuntime";
pub const STAGE_POSTSTOP: &str = "poststop";

const DIR_MODE: u32 = 0o750;
const DESCRIPTOR_MODE: u32 = 0o644;
const PAYLOAD_MODE: u32 = 0o755;

/// Hook descriptor in the containers hooks.d 1.0.0 schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDescriptor {
    pub version: String,
    pub hook: HookCommand,
    pub when: HookWhen,
    pub stages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommand {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookWhen {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always: Option<bool>,
}

impl HookDescriptor {
    /// Descriptor that runs `payload` on every container, pointed at `socket`
    pub fn for_socket(payload: &Path, socket: &str) -> Self {
        let path = payload.display().to_string();
        Self {
            version: HOOK_VERSION.to_string(),
            hook: HookCommand {
                args: vec![path.clone(), "--runtime-socket".to_string(), socket.to_string()],
                path,
            },
            when: HookWhen { always: Some(true) },
            stages: vec![STAGE_CREATE_RUNTIME.to_string(), STAGE_POSTSTOP.to_string()],
        }
    }
}

/// Result of the optional hook installation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookOutcome {
    pub attempted: bool,
    pub succeeded: bool,
}

impl HookOutcome {
    pub const fn skipped() -> Self {
        Self {
            attempted: false,
            succeeded: false,
        }
    }

    pub const fn installed() -> Self {
        Self {
            attempted: true,
            succeeded: true,
        }
    }

    pub const fn failed() -> Self {
        Self {
            attempted: true,
            succeeded: false,
        }
    }

    pub const fn label_value(&self) -> &'static str {
        values::yes_no(self.succeeded)
    }
}

pub struct HookInstaller<'a> {
    paths: &'a HookPaths,
}

impl<'a> HookInstaller<'a> {
    pub fn new(paths: &'a HookPaths) -> Self {
        Self { paths }
    }

    /// Install the hook for `runtime` if `enabled`
    ///
    /// Never fails the run: errors are logged and reported through the
    /// returned outcome.
    pub fn run(&self, enabled: bool, runtime: &RuntimeInfo) -> HookOutcome {
        if !enabled {
            debug!("OCI hooks disabled, skipping installation");
            return HookOutcome::skipped();
        }

        let address = runtime.runtime.hook_socket_address(&runtime.socket);
        match self.install(&address) {
            Ok(()) => {
                info!(
                    "Installed OCI hook at {} for {}",
                    self.paths.descriptor_path().display(),
                    address
                );
                HookOutcome::installed()
            }
            Err(e) => {
                error!("Failed to apply OCI hook: {}", e);
                HookOutcome::failed()
            }
        }
    }

    /// Put the payload in place, then register the descriptor pointing at it
    pub fn install(&self, socket_address: &str) -> Result<()> {
        let payload = self.paths.payload_path();
        ensure_dir(&self.paths.payload_dir)?;
        copy_payload(&self.paths.payload_source, &payload)?;

        ensure_dir(&self.paths.hook_dir)?;
        let descriptor = HookDescriptor::for_socket(&payload, socket_address);
        let bytes = serde_json::to_vec(&descriptor)
            .map_err(|e| SnitchError::HookError(format!("failed to encode descriptor: {}", e)))?;
        write_if_changed(&self.paths.descriptor_path(), &bytes, DESCRIPTOR_MODE)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .map_err(|e| SnitchError::HookError(format!("failed to create {}: {}", dir.display(), e)))
}

/// Replace `path` with `contents` unless it already holds them
///
/// The new contents go to a hidden sibling file first and are renamed over
/// `path`, so readers never see a half-written file.
fn write_if_changed(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    if fs::read(path).map(|existing| existing == contents).unwrap_or(false) {
        debug!("{} is up to date", path.display());
        return Ok(());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{}.tmp", name));

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(mode)
        .open(&staging)
        .map_err(|e| {
            SnitchError::HookError(format!("failed to open {}: {}", staging.display(), e))
        })?;
    file.write_all(contents).map_err(|e| {
        SnitchError::HookError(format!("failed to write {}: {}", staging.display(), e))
    })?;
    drop(file);

    fs::rename(&staging, path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        SnitchError::HookError(format!("failed to replace {}: {}", path.display(), e))
    })
}

/// Copy the hook binary into place unless an identical copy is already there
fn copy_payload(source: &Path, dest: &Path) -> Result<()> {
    let wanted = fs::read(source).map_err(|e| {
        SnitchError::HookError(format!("failed to read {}: {}", source.display(), e))
    })?;

    write_if_changed(dest, &wanted, PAYLOAD_MODE)?;

    // The staging file's mode is filtered by the umask, so set it explicitly.
    fs::set_permissions(dest, fs::Permissions::from_mode(PAYLOAD_MODE)).map_err(|e| {
        SnitchError::HookError(format!("failed to chmod {}: {}", dest.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ContainerRuntime;
    use tempfile::TempDir;

    fn paths_in(root: &Path) -> HookPaths {
        HookPaths {
            hook_dir: root.join("hooks.d"),
            hook_file: "ka.json".to_string(),
            payload_dir: root.join("kubearmor"),
            payload_file: "hook".to_string(),
            payload_source: root.join("hook-src"),
        }
    }

    fn crio() -> RuntimeInfo {
        RuntimeInfo {
            runtime: ContainerRuntime::CriO,
            socket: "/var/run/crio/crio.sock".to_string(),
            nri_socket: None,
        }
    }

    #[test]
    fn test_descriptor_shape() {
        let descriptor =
            HookDescriptor::for_socket(Path::new("/usr/share/kubearmor/hook"), "/run/x.sock");
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["hook"]["path"], "/usr/share/kubearmor/hook");
        assert_eq!(
            json["hook"]["args"],
            serde_json::json!(["/usr/share/kubearmor/hook", "--runtime-socket", "/run/x.sock"])
        );
        assert_eq!(json["when"]["always"], true);
        assert_eq!(json["stages"], serde_json::json!(["createRuntime", "poststop"]));
    }

    #[test]
    fn test_disabled_is_not_attempted() {
        let root = TempDir::new().unwrap();
        let paths = paths_in(root.path());

        let outcome = HookInstaller::new(&paths).run(false, &crio());
        assert_eq!(outcome, HookOutcome::skipped());
        assert_eq!(outcome.label_value(), "no");
        assert!(!paths.hook_dir.exists());
    }

    #[test]
    fn test_install_writes_descriptor_and_payload() {
        let root = TempDir::new().unwrap();
        let paths = paths_in(root.path());
        fs::write(&paths.payload_source, b"#!/bin/sh\nexit 0\n").unwrap();

        let outcome = HookInstaller::new(&paths).run(true, &crio());
        assert_eq!(outcome, HookOutcome::installed());
        assert_eq!(outcome.label_value(), "yes");

        let raw = fs::read(paths.descriptor_path()).unwrap();
        let descriptor: HookDescriptor = serde_json::from_slice(&raw).unwrap();
        assert_eq!(descriptor.hook.args[2], "unix:///var/run/crio/crio.sock");

        let payload = paths.payload_path();
        assert_eq!(fs::read(&payload).unwrap(), b"#!/bin/sh\nexit 0\n");
        let mode = fs::metadata(&payload).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_install_replaces_stale_payload() {
        let root = TempDir::new().unwrap();
        let paths = paths_in(root.path());
        fs::write(&paths.payload_source, b"new").unwrap();
        fs::create_dir_all(&paths.payload_dir).unwrap();
        fs::write(paths.payload_path(), b"old-and-longer").unwrap();
        fs::set_permissions(paths.payload_path(), fs::Permissions::from_mode(0o600)).unwrap();

        HookInstaller::new(&paths).install("/run/containerd/containerd.sock").unwrap();

        assert_eq!(fs::read(paths.payload_path()).unwrap(), b"new");
        let mode = fs::metadata(paths.payload_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_install_is_idempotent() {
        let root = TempDir::new().unwrap();
        let paths = paths_in(root.path());
        fs::write(&paths.payload_source, b"payload").unwrap();

        let installer = HookInstaller::new(&paths);
        installer.install("/run/containerd/containerd.sock").unwrap();
        let first = fs::read(paths.descriptor_path()).unwrap();
        installer.install("/run/containerd/containerd.sock").unwrap();

        assert_eq!(fs::read(paths.descriptor_path()).unwrap(), first);
    }

    #[test]
    fn test_unwritable_hook_dir_fails_softly() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let mut paths = paths_in(root.path());
        paths.hook_dir = blocker.join("hooks.d");

        let outcome = HookInstaller::new(&paths).run(true, &crio());
        assert_eq!(outcome, HookOutcome::failed());
        assert_eq!(outcome.label_value(), "no");
    }

    #[test]
    fn test_missing_payload_source_fails() {
        let root = TempDir::new().unwrap();
        let paths = paths_in(root.path());

        let err = HookInstaller::new(&paths).install("/run/docker.sock").unwrap_err();
        assert!(matches!(err, SnitchError::HookError(_)));
        // No descriptor may point at a payload that is not there.
        assert!(!paths.descriptor_path().exists());
    }

    #[test]
    fn test_descriptor_replaced_without_leftovers() {
        let root = TempDir::new().unwrap();
        let paths = paths_in(root.path());
        fs::write(&paths.payload_source, b"payload").unwrap();
        fs::create_dir_all(&paths.hook_dir).unwrap();
        fs::write(paths.descriptor_path(), b"{\"version\":\"0.9\"}").unwrap();

        HookInstaller::new(&paths).install("/run/containerd/containerd.sock").unwrap();

        let raw = fs::read(paths.descriptor_path()).unwrap();
        let descriptor: HookDescriptor = serde_json::from_slice(&raw).unwrap();
        assert_eq!(descriptor.version, "1.0.0");
        assert_eq!(descriptor.hook.args[2], "/run/containerd/containerd.sock");

        let names: Vec<_> = fs::read_dir(&paths.hook_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["ka.json".to_string()]);
    }
}
