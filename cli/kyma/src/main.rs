//! Kyma CLI
//!
//! Connects external applications to a Kyma cluster and deploys kubeless
//! functions to it. Every command performs one reconciliation pass against the
//! cluster and exits; logs go to stderr, command results to stdout.

mod cli;
mod commands;
mod config;
mod descriptor;
mod kubeconfig;
mod scaffold;

use anyhow::{anyhow, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Cancellation, Settings};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_logging(cli.verbose);

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install the rustls crypto provider"))?;

    let settings = Settings::from_cli(&cli);
    let cancellation = Cancellation::watch(settings.timeout);
    let cancel = cancellation.token();
    cancellation.run(dispatch(&cli, &settings, cancel)).await
}

async fn dispatch(cli: &Cli, settings: &Settings, cancel: CancellationToken) -> Result<()> {
    match &cli.command {
        Commands::CreateApplication(args) => {
            let reconciler = settings.reconciler(cancel).await?;
            let result = commands::connectivity::create_application(&reconciler, args).await?;
            println!("Application {} {}", args.name, result.outcome);
        }
        Commands::BindNamespace(args) => {
            let reconciler = settings.reconciler(cancel).await?;
            let report = commands::connectivity::bind_namespace(&reconciler, args).await?;
            println!("Namespace {} {}", args.namespace, report.namespace);
            println!("ApplicationMapping {}/{} {}", args.namespace, args.name, report.mapping);
            for (instance, outcome) in &report.service_instances {
                println!("ServiceInstance {}/{} {}", args.namespace, instance, outcome);
            }
        }
        Commands::CreateToken(args) => {
            let reconciler = settings.reconciler(cancel).await?;
            let url = commands::connectivity::create_token(&reconciler, args).await?;
            println!("{url}");
        }
        Commands::Deploy(args) => {
            let reconciler = settings.reconciler(cancel).await?;
            let report = commands::function::deploy(&reconciler, args).await?;
            println!("Function {}", report.function);
            if let Some(api) = &report.api {
                println!("Api {api}");
            }
        }
        Commands::NewLambda(args) => {
            let report = commands::function::new_lambda(args, settings.kubeconfig.as_deref())?;
            info!(
                "Lambda {} scaffolded: {} created, {} skipped",
                args.name,
                report.created.len(),
                report.skipped.len()
            );
        }
    }

    Ok(())
}
