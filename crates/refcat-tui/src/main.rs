//! `refcat-tui`: terminal console for the reference-data catalogue.
//!
//! Two screens: the management console (data types on the left, their
//! points on the right, with add / edit / toggle / delete) and a live
//! preview of the select and radio choice controls for any data type.
//!
//! Logs go to a file (default `/tmp/refcat-tui.log`) so they never tear
//! the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
#[cfg(test)]
mod testing;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use refcat_core::Catalogue;

use crate::app::App;

/// Browse and curate the reference-data catalogue from the terminal.
#[derive(Parser, Debug)]
#[command(name = "refcat-tui", version, about)]
struct Cli {
    /// Profile from the shared refcat config file
    #[arg(short = 'p', long, env = "REFCAT_PROFILE")]
    profile: Option<String>,

    /// Catalogue API base URL (overrides the profile)
    #[arg(short = 'u', long, env = "REFCAT_API_BASE_URL")]
    api_url: Option<String>,

    /// Data type to open on the preview screen
    #[arg(short = 't', long, default_value = "urgency_levels")]
    data_type: String,

    /// Log file path
    #[arg(long, default_value = "/tmp/refcat-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. Returns the guard that flushes the writer on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("refcat_tui={log_level},refcat_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("refcat-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    // CLI flag / env > profile > built-in default
    let cfg = refcat_config::load_config_or_default();
    let catalogue_config = refcat_config::resolve_with_override(
        &cfg,
        cli.profile.as_deref(),
        cli.api_url.as_deref(),
    )
    .wrap_err("could not resolve catalogue configuration")?;

    info!(
        url = %catalogue_config.api_base_url,
        data_type = %cli.data_type,
        "starting refcat-tui"
    );

    let catalogue = Catalogue::connect(&catalogue_config)
        .wrap_err("could not build the catalogue client")?;
    let mut app = App::new(&catalogue, &cli.data_type, catalogue_config.api_base_url);
    app.run().await?;

    Ok(())
}
