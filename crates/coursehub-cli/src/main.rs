//! CourseHub CLI - a terminal client for the CourseHub course store.
//!
//! Logs in against the REST backend, keeps the session tokens in the
//! configured token store, and lists courses, lessons and orders.

mod cli;
mod commands;

use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coursehub_core::{ApiClient, ApiError, AuthPipeline, Config};

use cli::Cli;

/// Exit code signalling that the user has to log in again
const EXIT_SESSION_EXPIRED: u8 = 2;

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::SessionExpired)) {
                eprintln!("Your session has expired. Run `coursehub login` to sign in again.");
                return ExitCode::from(EXIT_SESSION_EXPIRED);
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    // Flag beats environment beats config file
    let base_url = cli.api_url.unwrap_or_else(|| config.api_base_url());
    let store = config.token_store()?;
    let pipeline = AuthPipeline::new(base_url, config.request_timeout(), store)?;
    let client = ApiClient::with_pipeline(Arc::new(pipeline));
    info!(base_url = %client.pipeline().base_url(), "CourseHub CLI starting");

    commands::execute(cli.command, &client, &mut config).await
}
