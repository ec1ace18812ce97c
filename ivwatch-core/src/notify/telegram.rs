//! Telegram Bot API notifier.

use super::{Notifier, NotifyError};
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";

/// Sends messages through the Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            bot_token,
            chat_id,
        })
    }

    fn send_url(&self) -> String {
        format!("{API_BASE}/bot{}/sendMessage", self.bot_token)
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.send_url())
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            // without_url keeps the bot token out of the error text
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
