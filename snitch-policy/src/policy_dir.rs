//! Local policy directory lookups

use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const DEFAULT_POLICY_DIR: &str = "/opt/kubearmor/policies";

#[derive(Debug, Clone)]
pub struct PolicyDir {
    root: PathBuf,
}

impl PolicyDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn policy_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.yaml", name))
    }

    /// Whether `<name>.yaml` exists in the directory
    ///
    /// Errors other than "not found" are logged and treated as absent.
    pub fn contains(&self, name: &str) -> bool {
        let path = self.policy_path(name);
        match fs::metadata(&path) {
            Ok(_) => {
                debug!("Policy file {} exists", path.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Policy file {} does not exist", path.display());
                false
            }
            Err(e) => {
                debug!("Error checking policy file {}: {}", path.display(), e);
                false
            }
        }
    }
}

impl Default for PolicyDir {
    fn default() -> Self {
        Self::new(DEFAULT_POLICY_DIR)
    }
}
