//! Seccomp profile loading
//!
//! The platform ships a seccomp profile for its own pods. Kubelet only finds
//! profiles under its seccomp directory, so the snitch copies the bundled
//! profile there before labelling the node.

use crate::config::SECCOMP_PROFILE_FILE;
use crate::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Copy the bundled profile into `profile_dir`
///
/// Returns `Ok(false)` when no bundled profile exists. An identical profile
/// already in place is left untouched.
pub fn install_profile(source: &Path, profile_dir: &Path) -> Result<bool> {
    if !source.is_file() {
        debug!("No bundled seccomp profile at {}", source.display());
        return Ok(false);
    }

    let wanted = fs::read(source)?;
    let dest = profile_dir.join(SECCOMP_PROFILE_FILE);

    if fs::read(&dest).map(|current| current == wanted).unwrap_or(false) {
        debug!("Seccomp profile {} is up to date", dest.display());
        return Ok(true);
    }

    fs::create_dir_all(profile_dir)?;
    fs::write(&dest, &wanted)?;
    info!("Installed seccomp profile at {}", dest.display());
    Ok(true)
}

/// Best-effort wrapper used by the run; failures only lose the profile
pub fn load_in_node(source: &Path, profile_dir: &Path) {
    if let Err(e) = install_profile(source, profile_dir) {
        warn!("Failed to load seccomp profile into {}: {}", profile_dir.display(), e);
    }
}
