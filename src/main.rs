use clap::Parser;
use log::{error, info};
use runnerbox::configuration::Args;
use runnerbox::controller::Provisioner;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
     runnerbox - Proxmox LXC provisioning for GitHub Actions runners
==============================================================================
"
    );

    let args = Args::parse();

    info!("Resolving configuration");
    let provisioner = match Provisioner::new(&args) {
        Ok(provisioner) => provisioner,
        Err(e) => {
            error!("Unable to resolve configuration: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = provisioner.run().await {
        error!("Provisioning aborted: {}", e);
        std::process::exit(1);
    }

    info!("Done");
}
