//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{AppConfig, BybitConfig};
use crate::common::errors::{BotError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    // Add default config file if it exists
    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // Add environment variables with APP_ prefix
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| BotError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| BotError::Configuration(e.to_string()))
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();

    let bybit = BybitConfig {
        api_key: std::env::var("BYBIT_API_KEY").ok(),
        api_secret: std::env::var("BYBIT_API_SECRET").ok(),
        rest_url: std::env::var("BYBIT_REST_URL")
            .unwrap_or_else(|_| "https://api.bybit.com".to_string()),
        recv_window_ms: 5000,
    };

    let telegram = match (
        std::env::var("TELEGRAM_BOT_TOKEN").ok(),
        std::env::var("TELEGRAM_CHANNEL_ID").ok(),
    ) {
        (Some(bot_token), Some(channel_id)) => Some(super::types::TelegramConfig {
            bot_token,
            channel_id,
            api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
        }),
        _ => None,
    };

    let ledger = std::env::var("LEDGER_WEBHOOK_URL")
        .ok()
        .map(|webhook_url| super::types::LedgerConfig { webhook_url });

    let mut redis = super::types::RedisConfig::default();
    if let Ok(url) = std::env::var("REDIS_URL") {
        redis.url = url;
    }

    let mut settings = super::types::AppSettings::default();
    if let Ok(port) = std::env::var("PORT") {
        settings.listen_addr = format!("0.0.0.0:{}", port);
    }

    Ok(AppConfig {
        bybit,
        redis,
        telegram,
        ledger,
        trading: super::types::TradingConfig::default(),
        settings,
    })
}
