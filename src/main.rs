use clap::Parser;
use kubearmor_snitch::cli::Cli;
use kubearmor_snitch::config::SnitchConfig;
use kubearmor_snitch::k8s::K8sClient;
use kubearmor_snitch::probe::FsProbe;
use kubearmor_snitch::{Result, Snitch};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = Cli::parse().into_config();

    let filter = match config.log_filter() {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting snitch v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&config).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(config: &SnitchConfig) -> Result<()> {
    info!(
        "KubeConfig path={}",
        config
            .kubeconfig
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    );
    let client =
        K8sClient::from_kubeconfig(config.kubeconfig.as_deref(), config.context.as_deref())
            .await?;
    let probe = FsProbe::new(&config.path_prefix);

    Snitch::new(config, &probe, &client).run().await?;
    Ok(())
}
