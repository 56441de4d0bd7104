///
/// This module implements the full CLI interface for docfeed—handling command
/// parsing, argument validation, main entrypoints, and user-visible
/// invocations.
///
/// All core business logic (data models, pipelines, and the sync
/// orchestration) lives in the [`docfeed-core`] crate. This module is strictly
/// for CLI glue: constructing the concrete HTTP implementations and handing
/// them to the pipeline.
///
/// ## Features
/// - Entry struct [`Cli`] defines all user-facing options and subcommands.
/// - Subcommand routing (e.g., `sync`) and argument validation.
/// - Async entrypoint (`run`) for programmatic invocation and integration
///   testing.
///
/// ## How To Use
/// - For command-line users: use the installed `docfeed` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use docfeed_core::auth::{CachedTokenProvider, OAuthTokenProvider};
use docfeed_core::client::HttpIndexClient;
use docfeed_core::ratelimit::RequestPacer;
use docfeed_core::source::HttpSource;
use docfeed_core::sync::run_sync;
use std::path::PathBuf;
use std::time::Duration;

/// CLI for docfeed: feed an external document source into a search index
/// under one tracked sync job.
#[derive(Parser)]
#[clap(
    name = "docfeed",
    version,
    about = "Synchronise documents from an OAuth2 HTTP source into a search index under a tracked sync job"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one sync job: list, fetch and batch-upload all source documents
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "sync", "Starting synchronisation process");

            let http = reqwest::Client::new();
            let provider = CachedTokenProvider::new(OAuthTokenProvider::new(
                http.clone(),
                config.oauth.clone(),
            ));
            let source = HttpSource::new(http.clone(), config.source.clone());
            let client = HttpIndexClient::new(
                http,
                config.index.endpoint.clone(),
                config.index.api_key.clone(),
            );
            let pacer = RequestPacer::new(config.limits.requests_per_second);
            let deadline = config.limits.run_timeout_seconds.map(Duration::from_secs);
            let target = config.index.job_target();

            match run_sync(&target, &provider, &source, &client, &pacer, deadline).await {
                Ok(report) => {
                    tracing::info!(command = "sync", ?report, "Synchronisation complete");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(e.into())
                }
            }
        }
    }
}
