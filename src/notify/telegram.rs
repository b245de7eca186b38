//! Telegram channel notifier

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use super::Notifier;
use crate::config::types::TelegramConfig;

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Posts messages to a Telegram channel via the Bot API
pub struct TelegramNotifier {
    client: Client,
    url: String,
    channel_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            channel_id: config.channel_id.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) {
        let request = SendMessageRequest {
            chat_id: &self.channel_id,
            text,
            parse_mode: "Markdown",
        };

        match self.client.post(&self.url).json(&request).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "Telegram rejected notification");
            }
            Ok(_) => {}
            Err(e) => warn!("failed to send Telegram notification: {}", e),
        }
    }
}

/// Used when no Telegram channel is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _text: &str) {}
}
