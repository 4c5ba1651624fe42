// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;
mod context;
mod dispatch;
mod router;
mod schedule;
mod telegram;
mod transport;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use kho_app::init_logging;
use kho_core::{ComplianceTracker, DatePolicy, DynResult, Roster};

use config::ServerConfig;
use context::BotContext;
use telegram::TelegramClient;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - warehouse daily report bot");

/// Single-destination name used by older deployments.
const LEGACY_DESTINATIONS_ENV: &str = "SUMMARY_CHAT_ID";

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Bot API token
    #[arg(long = "token", env = "BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Warehouse roster CSV file
    #[arg(long = "roster", value_name = "FILE")]
    roster: Option<PathBuf>,
    /// Comma-separated chat ids receiving summaries
    #[arg(long = "destinations", env = "SUMMARY_CHAT_IDS")]
    destinations: Option<String>,
}

/// Command-line and environment values take priority over the file.
/// `legacy_destinations` is only consulted when `--destinations` and
/// `SUMMARY_CHAT_IDS` are both absent.
fn apply_overrides(cli: &Cli, cfg: &mut ServerConfig, legacy_destinations: Option<String>) {
    if let Some(ref token) = cli.token {
        cfg.telegram.token = Some(token.clone());
    }
    if let Some(ref roster) = cli.roster {
        cfg.roster.path = roster.clone();
    }
    if let Some(destinations) = cli.destinations.clone().or(legacy_destinations) {
        cfg.summary.destinations = destinations;
    }
}

pub(crate) async fn wait_for_shutdown(mut shutdown_rx: watch::Receiver<bool>) {
    if *shutdown_rx.borrow() {
        return;
    }
    while shutdown_rx.changed().await.is_ok() {
        if *shutdown_rx.borrow() {
            break;
        }
    }
}

#[tokio::main]
async fn main() -> DynResult<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", ServerConfig::example_toml());
        return Ok(());
    }

    let (mut cfg, config_path) = if let Some(ref path) = cli.config {
        let cfg = ServerConfig::load_from_file(path)?;
        (cfg, Some(path.clone()))
    } else {
        ServerConfig::load_from_default_paths()?
    };
    apply_overrides(&cli, &mut cfg, std::env::var(LEGACY_DESTINATIONS_ENV).ok());
    cfg.validate()
        .map_err(|e| format!("Invalid server configuration: {}", e))?;

    init_logging(cfg.general.log_level.as_deref());

    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }

    let token = cfg
        .telegram
        .token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or("Bot token not specified. Use --token, BOT_TOKEN or set [telegram].token in config.")?;
    let destinations = cfg.destination_ids()?;
    if destinations.is_empty() {
        return Err("No summary destinations. Use --destinations, SUMMARY_CHAT_IDS, SUMMARY_CHAT_ID or set [summary].destinations in config.".into());
    }
    let schedule = cfg.schedule()?;

    let roster = Roster::load(&cfg.roster.path)?;
    info!(
        "Loaded {} warehouses from {}",
        roster.len(),
        cfg.roster.path.display()
    );

    let policy = DatePolicy::from_require_date(cfg.report.require_date);
    let client = TelegramClient::new(
        &cfg.telegram.api_url,
        &token,
        cfg.telegram.poll_timeout_secs,
    )?;
    let ctx = Arc::new(BotContext::new(
        ComplianceTracker::new(roster, policy),
        Arc::new(client),
        destinations,
        schedule.utc_offset,
    ));

    info!(
        "Starting kho-server (offset {}, first pass {}, follow-up {}, {} destinations)",
        schedule.utc_offset,
        schedule.first_pass.format("%H:%M"),
        schedule.follow_up.format("%H:%M"),
        ctx.destinations.len()
    );

    let mut task_handles: Vec<JoinHandle<()>> = Vec::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poll_timeout_secs = cfg.telegram.poll_timeout_secs;
    let updates_ctx = Arc::clone(&ctx);
    let updates_shutdown_rx = shutdown_rx.clone();
    task_handles.push(tokio::spawn(async move {
        router::run_update_loop(updates_ctx, poll_timeout_secs, updates_shutdown_rx).await;
    }));

    let scheduler_ctx = Arc::clone(&ctx);
    let scheduler_shutdown_rx = shutdown_rx.clone();
    task_handles.push(tokio::spawn(async move {
        schedule::run_scheduler(scheduler_ctx, schedule, scheduler_shutdown_rx).await;
    }));

    signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down");
    let _ = shutdown_tx.send(true);
    tokio::time::sleep(Duration::from_millis(400)).await;

    for handle in &task_handles {
        if !handle.is_finished() {
            handle.abort();
        }
    }
    for handle in task_handles {
        let _ = handle.await;
    }
    Ok(())
}
