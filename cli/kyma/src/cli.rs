use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "kyma")]
#[command(about = "Connect applications to Kyma and deploy functions to it")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the kubeconfig file (defaults to the standard resolution)
    #[arg(long, global = true, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Give up waiting on the cluster after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an application and wait until it is deployed
    CreateApplication(CreateApplicationArgs),
    /// Bind an application to a namespace
    BindNamespace(BindNamespaceArgs),
    /// Request a one-time connector URL for an application
    CreateToken(CreateTokenArgs),
    /// Deploy the function described by kyma.json in a project directory
    Deploy(DeployArgs),
    /// Scaffold a new lambda project from a template tree
    NewLambda(NewLambdaArgs),
}

#[derive(Debug, Args)]
pub struct CreateApplicationArgs {
    /// Application name
    pub name: String,

    /// Description stored on the application
    #[arg(long)]
    pub description: Option<String>,

    /// Succeed without changes if the application already exists
    #[arg(long)]
    pub ignore_if_existing: bool,
}

#[derive(Debug, Args)]
pub struct BindNamespaceArgs {
    /// Application name
    #[arg(short, long)]
    pub name: String,

    /// Namespace to bind the application to
    #[arg(long)]
    pub namespace: String,

    /// Create the namespace when it does not exist
    #[arg(long, visible_alias = "create")]
    pub create_namespace: bool,

    /// Continue if the application is already bound to the namespace
    #[arg(long)]
    pub ignore_if_existing: bool,
}

#[derive(Debug, Args)]
pub struct CreateTokenArgs {
    /// Application name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Project directory containing kyma.json
    #[arg(short = 'd', long, default_value = ".")]
    pub workdir: PathBuf,
}

#[derive(Debug, Args)]
pub struct NewLambdaArgs {
    /// Lambda name, also the output directory name
    pub name: String,

    /// Namespace the lambda will be deployed to
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Expose the lambda through an Api
    #[arg(long)]
    pub expose: bool,

    /// Cluster domain used for the exposed hostname (derived from the kubeconfig if omitted)
    #[arg(long)]
    pub cluster_domain: Option<String>,

    /// Root of the lambda template tree
    #[arg(long, env = "KYMA_TEMPLATE_ROOT")]
    pub template_root: PathBuf,

    /// Directory the project directory is created in
    #[arg(long, default_value = ".")]
    pub output_root: PathBuf,
}
