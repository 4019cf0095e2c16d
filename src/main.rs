// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Monad Farmer - randomized Izumi and Bean swap activity for Monad testnet accounts.

mod accounts;
mod balances;
mod bot;
mod config;
mod error;
mod executor;
mod process;
mod rpc;
mod runner;
mod strategies;
mod telegram;
mod tokens;

use clap::{Parser, Subcommand};
use config::Settings;
use process::Process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use telegram::TelegramNotifier;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "monad-farmer")]
#[command(about = "Randomized DEX swap farming on Monad testnet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured tasks for the selected accounts
    Run {
        /// Plan and encode swaps without sending anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a balance table for every stored account
    Balances,

    /// Serve the Telegram command bot
    Bot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let mut settings = Settings::from_env().map_err(anyhow::Error::msg)?;

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            settings.swap.dry_run |= dry_run;
            run(Arc::new(settings)).await
        }
        Commands::Balances => {
            let table = balances::balance_report(&settings)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("{table}");
            Ok(())
        }
        Commands::Bot => bot::run_bot(Arc::new(settings))
            .await
            .map_err(anyhow::Error::msg),
    }
}

async fn run(settings: Arc<Settings>) -> anyhow::Result<()> {
    info!("🚀 Monad Farmer starting...");
    info!("📡 RPC: {}", settings.rpc_url);
    info!("📋 Tasks: {}", settings.tasks.join(", "));
    if settings.swap.dry_run {
        warn!("🧪 DRY RUN: nothing will be sent");
    }

    let notifier = TelegramNotifier::new(
        settings.telegram_notifications,
        settings.telegram_token.clone(),
        settings.telegram_chat_id.clone(),
    );

    // Stop between tasks on Ctrl+C
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("🛑 Shutdown signal received, finishing current task...");
            flag.store(true, Ordering::SeqCst);
        }
    });

    Process::new(settings, notifier, stop)
        .run()
        .await
        .map_err(anyhow::Error::msg)
}
