// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram command bot: start, stop and inspect farming from a chat.

use crate::balances::balance_report;
use crate::config::Settings;
use crate::process::Process;
use crate::telegram::TelegramNotifier;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Monad farmer commands:")]
pub enum Command {
    #[command(description = "show this menu.")]
    Start,
    #[command(description = "start farming in the background.")]
    Run,
    #[command(description = "balance report for every account.")]
    Balance,
    #[command(description = "stop after the current task.")]
    Stop,
}

pub struct BotState {
    settings: Arc<Settings>,
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl BotState {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            stop: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_admin(&self, user_id: Option<u64>) -> bool {
        match (self.settings.telegram_admin_id, user_id) {
            (Some(admin), Some(user)) => admin == user,
            _ => false,
        }
    }
}

pub async fn run_bot(settings: Arc<Settings>) -> Result<(), String> {
    let token = settings
        .telegram_token
        .clone()
        .ok_or("TELEGRAM_BOT_TOKEN not set")?;
    if settings.telegram_admin_id.is_none() {
        return Err("TELEGRAM_ADMIN_ID not set".to_string());
    }

    info!("🤖 Telegram bot starting...");
    let bot = Bot::new(token);
    let state = Arc::new(BotState::new(settings));

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(answer);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    Ok(())
}

async fn answer(bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    let user_id = msg.from.as_ref().map(|user| user.id.0);
    if !state.is_admin(user_id) {
        bot.send_message(msg.chat.id, "⛔ Access denied").await?;
        return Ok(());
    }

    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Run => {
            if state.running.swap(true, Ordering::SeqCst) {
                bot.send_message(msg.chat.id, "⏳ Already running").await?;
                return Ok(());
            }
            state.stop.store(false, Ordering::SeqCst);
            bot.send_message(msg.chat.id, "🚀 Farming started").await?;

            let notifier = TelegramNotifier::for_chat(bot.clone(), msg.chat.id);
            let process = Process::new(state.settings.clone(), notifier.clone(), state.stop.clone());
            let running = state.running.clone();
            tokio::spawn(async move {
                if let Err(e) = process.run().await {
                    error!("❌ Process failed: {}", e);
                    notifier.send_message(&format!("❌ Process failed: {}", e)).await;
                }
                running.store(false, Ordering::SeqCst);
            });
        }
        Command::Balance => {
            let report = match balance_report(&state.settings).await {
                Ok(table) => table,
                Err(e) => format!("❌ Balance check failed: {}", e),
            };
            bot.send_message(msg.chat.id, report).await?;
        }
        Command::Stop => {
            state.stop.store(true, Ordering::SeqCst);
            let reply = if state.running.load(Ordering::SeqCst) {
                "🛑 Stopping after the current task"
            } else {
                "💤 Nothing is running"
            };
            bot.send_message(msg.chat.id, reply).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!(Command::parse("/run", "farmer_bot").unwrap(), Command::Run);
        assert_eq!(Command::parse("/balance", "farmer_bot").unwrap(), Command::Balance);
        assert!(Command::parse("/withdraw", "farmer_bot").is_err());
    }

    #[test]
    fn only_the_admin_is_served() {
        let mut settings = Settings::for_tests();
        settings.telegram_admin_id = Some(42);
        let state = BotState::new(Arc::new(settings));
        assert!(state.is_admin(Some(42)));
        assert!(!state.is_admin(Some(7)));
        assert!(!state.is_admin(None));

        let open = BotState::new(Arc::new(Settings::for_tests()));
        assert!(!open.is_admin(Some(42)));
    }
}
