// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram notifier module.

use teloxide::prelude::*;
use tracing::{error, info, warn};

#[derive(Clone, Default)]
pub struct TelegramNotifier {
    bot: Option<Bot>,
    chat_id: Option<ChatId>,
}

impl TelegramNotifier {
    pub fn new(enabled: bool, token: Option<String>, chat_id: Option<String>) -> Self {
        if !enabled {
            return Self::disabled();
        }
        info!(
            "📱 Initializing Telegram: token={}, chat_id={}",
            token.as_ref().map(|_| "SET").unwrap_or("NONE"),
            chat_id.as_ref().map(|_| "SET").unwrap_or("NONE")
        );

        let chat_id = chat_id.and_then(|id| match id.trim().parse::<i64>() {
            Ok(num) => Some(ChatId(num)),
            Err(_) => {
                warn!("Invalid TELEGRAM_CHAT_ID {}, notifications disabled", id);
                None
            }
        });

        Self {
            bot: token.map(Bot::new),
            chat_id,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Same bot, different chat.
    pub fn for_chat(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot: Some(bot),
            chat_id: Some(chat_id),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bot.is_some() && self.chat_id.is_some()
    }

    /// Fire-and-forget; delivery never blocks the caller.
    pub fn notify(&self, message: String) {
        if !self.is_enabled() {
            return;
        }
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.send_message(&message).await;
        });
    }

    pub async fn send_message(&self, message: &str) {
        if let (Some(bot), Some(chat_id)) = (&self.bot, &self.chat_id) {
            let result = bot.send_message(*chat_id, message).await;
            match result {
                Ok(_) => info!("📤 Sent Telegram message"),
                Err(e) => error!("Failed to send Telegram message: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_unless_switched_on_and_configured() {
        let off = TelegramNotifier::new(false, Some("1:abc".into()), Some("42".into()));
        assert!(!off.is_enabled());

        let no_chat = TelegramNotifier::new(true, Some("1:abc".into()), None);
        assert!(!no_chat.is_enabled());

        let bad_chat = TelegramNotifier::new(true, Some("1:abc".into()), Some("chat".into()));
        assert!(!bad_chat.is_enabled());

        let on = TelegramNotifier::new(true, Some("1:abc".into()), Some("-100123".into()));
        assert!(on.is_enabled());

        // no runtime needed when disabled
        off.notify("ignored".to_string());
    }
}
