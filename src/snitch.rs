//! The detection-and-publication run
//!
//! Stages run strictly in order: seccomp profile, enforcer, runtime, OCI
//! hook, host capabilities, labels, publish. Only the last stage touches the
//! cluster, so an interrupted run leaves the node's labels unchanged.

use crate::config::SnitchConfig;
use crate::hook::{HookInstaller, HookOutcome};
use crate::k8s::{NodePatcher, NodePublisher};
use crate::labels::{compose_labels, HostCapabilities, LabelSet};
use crate::probe::{HostProbe, RuntimeInfo};
use crate::resolve::{detect_enforcer, resolve_runtime, Enforcer};
use crate::{seccomp, Result};
use tracing::info;

/// What a successful run decided and published
#[derive(Debug, Clone)]
pub struct RunReport {
    pub enforcer: Enforcer,
    pub runtime: RuntimeInfo,
    pub hook: HookOutcome,
    pub labels: LabelSet,
    pub patch: serde_json::Value,
}

pub struct Snitch<'a> {
    config: &'a SnitchConfig,
    probe: &'a dyn HostProbe,
    patcher: &'a dyn NodePatcher,
}

impl<'a> Snitch<'a> {
    pub fn new(
        config: &'a SnitchConfig,
        probe: &'a dyn HostProbe,
        patcher: &'a dyn NodePatcher,
    ) -> Self {
        Self {
            config,
            probe,
            patcher,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let config = self.config;
        config.validate()?;

        info!("Running snitch in node {}", config.node_name);
        info!("lsm order={}", config.lsm_order.join(","));
        info!("path prefix={}", config.path_prefix.display());
        info!("k8s runtime={}", config.runtime.as_deref().unwrap_or(""));

        seccomp::load_in_node(&config.seccomp_source, &config.seccomp_profile_dir());

        let enforcer = detect_enforcer(&config.lsm_order, self.probe);
        let runtime = resolve_runtime(self.probe, config.runtime.as_deref(), &config.path_prefix)?;
        let hook = HookInstaller::new(&config.hook_paths).run(config.oci_hooks, &runtime);

        let caps = HostCapabilities::gather(self.probe);
        let labels = compose_labels(&enforcer, &runtime, &caps, &hook);

        let patch = NodePublisher::new(self.patcher)
            .publish(&config.node_name, &labels)
            .await?;

        Ok(RunReport {
            enforcer,
            runtime,
            hook,
            labels,
            patch,
        })
    }
}
