//! Enforcer selection
//!
//! Walks the caller's LSM preference order and picks the first enforcer the
//! host can actually use. Finding none is a valid outcome: enforcement is
//! simply disabled on the node.

use crate::probe::HostProbe;
use snitch_common::values;
use std::fmt;
use tracing::info;

const APPARMOR: &str = "apparmor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcer {
    Lsm(String),
    None,
}

impl Enforcer {
    pub fn as_str(&self) -> &str {
        match self {
            Enforcer::Lsm(name) => name,
            Enforcer::None => values::NONE,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Enforcer::None)
    }
}

impl fmt::Display for Enforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Return the first entry of `order` for which `usable` holds
pub fn resolve_enforcer<F>(order: &[String], usable: F) -> Enforcer
where
    F: Fn(&str) -> bool,
{
    order
        .iter()
        .find(|lsm| usable(lsm.as_str()))
        .map(|lsm| Enforcer::Lsm(lsm.clone()))
        .unwrap_or(Enforcer::None)
}

/// Pick the node enforcer using the host probe
///
/// AppArmor additionally needs its filesystem mounted; when it is missing the
/// scan moves on to the next preference. No other enforcer has a secondary
/// check.
pub fn detect_enforcer(order: &[String], probe: &dyn HostProbe) -> Enforcer {
    let enforcer = resolve_enforcer(order, |lsm| {
        if !probe.lsm_usable(lsm) {
            return false;
        }
        if lsm == APPARMOR && !probe.apparmor_fs_present() {
            info!("AppArmor is enabled but apparmorfs is not mounted, skipping");
            return false;
        }
        true
    });

    match &enforcer {
        Enforcer::Lsm(name) => info!("Node enforcer is {}", name),
        Enforcer::None => {
            info!("Node doesn't support any of the preferred LSMs, enforcement is disabled")
        }
    }

    enforcer
}
