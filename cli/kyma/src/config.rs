//! Runtime configuration shared by every command

use crate::cli::Cli;
use anyhow::{anyhow, Context, Result};
use reconcile::Reconciler;
use resource_store::KubeStore;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Settings resolved from global flags and environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub kubeconfig: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            kubeconfig: cli.kubeconfig.clone(),
            timeout: cli.timeout.map(Duration::from_secs),
        }
    }

    /// Connect to the cluster named by the kubeconfig
    pub async fn connect(&self) -> Result<KubeStore> {
        match &self.kubeconfig {
            Some(path) => KubeStore::from_kubeconfig(path)
                .await
                .with_context(|| format!("Failed to load kubeconfig {}", path.display())),
            None => KubeStore::try_default()
                .await
                .context("Failed to connect to the cluster"),
        }
    }

    /// Reconciler over a live store whose waits stop when `cancel` fires
    pub async fn reconciler(&self, cancel: CancellationToken) -> Result<Reconciler> {
        let store = self.connect().await?;
        Ok(Reconciler::new(Arc::new(store)).with_cancellation(cancel))
    }
}

/// Why an invocation was cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Interrupted,
    TimedOut(Duration),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => write!(f, "Interrupted"),
            Self::TimedOut(limit) => write!(f, "Timed out after {}s", limit.as_secs()),
        }
    }
}

/// Cancellation of a whole invocation on Ctrl-C or when the timeout elapses
#[derive(Debug)]
pub struct Cancellation {
    token: CancellationToken,
    watcher: JoinHandle<Option<CancelReason>>,
}

impl Cancellation {
    pub fn watch(timeout: Option<Duration>) -> Self {
        let token = CancellationToken::new();
        let watcher = tokio::spawn(watch(token.clone(), timeout));
        Self { token, watcher }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Drive `work` to completion unless the invocation is cancelled first
    ///
    /// A cancelled run drops `work`, including any store call in flight.
    pub async fn run<T>(self, work: impl Future<Output = Result<T>>) -> Result<T> {
        let result = tokio::select! {
            result = work => result,
            () = self.token.cancelled() => {
                let reason = self.watcher.await.ok().flatten();
                return Err(reason.map_or_else(|| anyhow!("Cancelled"), |r| anyhow!("{r}")));
            }
        };
        // Stops the watcher
        self.token.cancel();
        result
    }
}

async fn watch(cancel: CancellationToken, timeout: Option<Duration>) -> Option<CancelReason> {
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            debug!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let reason = tokio::select! {
        () = cancel.cancelled() => None,
        () = interrupted => Some(CancelReason::Interrupted),
        () = deadline => timeout.map(CancelReason::TimedOut),
    };
    if let Some(reason) = reason {
        warn!("{}, cancelling", reason);
        cancel.cancel();
    }
    reason
}

/// Install the global subscriber writing to stderr
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_settings_from_flags() {
        let cli = Cli::try_parse_from([
            "kyma",
            "--kubeconfig",
            "/tmp/kubeconfig",
            "--timeout",
            "90",
            "create-token",
            "erp",
        ])
        .unwrap();
        let settings = Settings::from_cli(&cli);
        assert_eq!(settings.kubeconfig, Some(PathBuf::from("/tmp/kubeconfig")));
        assert_eq!(settings.timeout, Some(Duration::from_secs(90)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_work_that_never_finishes() {
        let cancellation = Cancellation::watch(Some(Duration::from_secs(5)));
        let token = cancellation.token();

        let started = tokio::time::Instant::now();
        let err = cancellation
            .run(std::future::pending::<Result<()>>())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Timed out after 5s");
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_work_keeps_its_result() {
        let cancellation = Cancellation::watch(Some(Duration::from_secs(5)));
        let token = cancellation.token();

        let value = cancellation.run(async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
        // The watcher is released rather than left to fire later
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_work_errors_pass_through() {
        let cancellation = Cancellation::watch(None);
        let err = cancellation
            .run(async { Err::<(), _>(anyhow!("store unreachable")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "store unreachable");
    }
}
