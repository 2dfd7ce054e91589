use crate::config::{
    default_kubeconfig, parse_lsm_order, HookPaths, SnitchConfig, DEFAULT_LSM_ORDER,
    DEFAULT_PATH_PREFIX,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snitch")]
#[command(author = "Authors of KubeArmor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Detect node related information for KubeArmor",
    long_about = "Detects the LSM enforcer and container runtime available on this node \
                  and publishes them as node labels for the KubeArmor control plane."
)]
pub struct Cli {
    #[arg(long, help = "Path to the kubeconfig file to use")]
    pub kubeconfig: Option<PathBuf>,

    #[arg(long, help = "Kubeconfig context to use")]
    pub context: Option<String>,

    #[arg(long, default_value = DEFAULT_LSM_ORDER, help = "LSM preference order to use")]
    pub lsm: String,

    #[arg(long = "nodename", default_value = "", help = "Node name to label")]
    pub node_name: String,

    #[arg(long = "pathprefix", default_value = DEFAULT_PATH_PREFIX, help = "Path prefix for runtime search")]
    pub path_prefix: PathBuf,

    #[arg(long, help = "Runtime detected by k8s")]
    pub runtime: Option<String>,

    #[arg(long = "oci-hooks", help = "Enable OCI hooks")]
    pub oci_hooks: bool,

    #[arg(long = "loglevel", default_value = "info", help = "Log level, e.g. debug, info, warn, error")]
    pub log_level: String,
}

impl Cli {
    pub fn into_config(self) -> SnitchConfig {
        let mut config = SnitchConfig::new(self.node_name);
        config.kubeconfig = self.kubeconfig.or_else(default_kubeconfig);
        config.context = self.context;
        config.lsm_order = parse_lsm_order(&self.lsm);
        config.path_prefix = self.path_prefix;
        config.runtime = self.runtime.filter(|r| !r.trim().is_empty());
        config.oci_hooks = self.oci_hooks;
        config.log_level = self.log_level;
        config.hook_paths = HookPaths::default();
        config
    }
}
