use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use gcast_core::config::GcastConfig;
use gcast_core::BroadcastReport;
use gcast_dispatch::DispatchEngine;
use gcast_telegram::TelegramTransport;

mod cli;
mod file_directory;
mod interrupt;

use cli::Cli;
use file_directory::FileDirectory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gcast=info,gcast_dispatch=info,gcast_telegram=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let payload = cli.command.payload()?;

    // load config: --config > GCAST_CONFIG env > ~/.gcast/gcast.toml
    let config = GcastConfig::load(cli.config.as_deref())?;
    let telegram = config
        .telegram
        .as_ref()
        .context("no [telegram] section in config (set telegram.bot_token)")?;

    let transport = Arc::new(TelegramTransport::new(telegram)?);
    let directory = Arc::new(FileDirectory::new(&cli.recipients));
    let engine = DispatchEngine::new(transport, directory, config.dispatch.clone())?;

    // Ctrl-C stops the run after the batch in flight; a second Ctrl-C exits.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if interrupt::escalate_interrupts(interrupt::ctrl_c_signals(), on_interrupt).await {
            std::process::exit(interrupt::INTERRUPTED_EXIT_CODE);
        }
    });

    info!(
        recipients = %cli.recipients.display(),
        payload = payload.kind(),
        "starting broadcast"
    );
    let run = engine.run_broadcast_until(&payload, &cancel).await;
    let run_failed = run.is_err();

    if cli.json {
        let json = match &run {
            Ok(result) => serde_json::to_string_pretty(result)?,
            Err(e) => serde_json::to_string_pretty(&serde_json::json!({
                "error": { "code": e.code(), "message": e.to_string() }
            }))?,
        };
        println!("{json}");
    } else {
        println!("{}", BroadcastReport::from(run));
    }

    if run_failed {
        std::process::exit(1);
    }
    Ok(())
}
