use clap::{Parser, Subcommand};
use crate::config::{Config, ConfigError, LoggingConfig, MetricsConfig};
use form_intake::errors::IntakeError;
use metrics_exporter_statsd::{StatsdBuilder, StatsdError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod config;

#[derive(Parser)]
#[command(version, about = "Records website form submissions in a spreadsheet")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve form submissions
    Run {
        /// YAML config file. Read from the environment when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not create statsd exporter: {0}")]
    Statsd(#[from] StatsdError),
    #[error("could not install metrics recorder: {0}")]
    MetricsRecorder(String),
    #[error("could not start runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Intake(#[from] IntakeError),
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Run { config } => {
            let config = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::from_env()?,
            };

            let _sentry = init_sentry(&config.logging);
            init_logging(&config.logging);
            if let Some(metrics) = &config.metrics {
                init_statsd(metrics)?;
            }

            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(CliError::Runtime)?;
            rt.block_on(form_intake::run(config.intake))?;
        }
    }

    Ok(())
}

fn init_sentry(config: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let sentry_layer = config
        .sentry_dsn
        .is_some()
        .then(sentry::integrations::tracing::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(sentry_layer)
        .init();
}

fn init_statsd(config: &MetricsConfig) -> Result<(), CliError> {
    let recorder =
        StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port).build(Some("formsheet"))?;
    metrics::set_global_recorder(recorder)
        .map_err(|e| CliError::MetricsRecorder(e.to_string()))?;
    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Exporting metrics to statsd"
    );
    Ok(())
}
