//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bybit venue configuration
    #[serde(default)]
    pub bybit: BybitConfig,
    /// Redis trade-context store configuration
    #[serde(default)]
    pub redis: RedisConfig,
    /// Telegram notifier configuration (optional; notifications are skipped
    /// when unset)
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// Spreadsheet ledger configuration (optional)
    #[serde(default)]
    pub ledger: Option<LedgerConfig>,
    /// Position sizing configuration
    #[serde(default)]
    pub trading: TradingConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Bybit V5 REST configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BybitConfig {
    /// API key for signed requests
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing requests
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Base URL for the REST API
    #[serde(default = "default_bybit_rest_url")]
    pub rest_url: String,
    /// Signature validity window in milliseconds
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            rest_url: default_bybit_rest_url(),
            recv_window_ms: default_recv_window(),
        }
    }
}

fn default_bybit_rest_url() -> String {
    "https://api.bybit.com".to_string()
}

fn default_recv_window() -> u64 {
    5000
}

/// Redis connection configuration for the durable trade-context store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for trade contexts
    #[serde(default = "default_redis_prefix")]
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_prefix(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_prefix() -> String {
    "trade".to_string()
}

/// Telegram channel notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub channel_id: String,
    /// API base URL, overridable in tests
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Append-only trade log configuration (a spreadsheet webhook endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// URL accepting POSTed JSON rows (e.g. an Apps Script web app)
    pub webhook_url: String,
}

/// Position sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Fixed risk budget in USD per trade
    #[serde(default = "default_risk_usd")]
    pub risk_usd: Decimal,
    /// Minimum interval between venue requests in milliseconds
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            risk_usd: default_risk_usd(),
            pace_ms: default_pace_ms(),
        }
    }
}

fn default_risk_usd() -> Decimal {
    Decimal::ONE
}

fn default_pace_ms() -> u64 {
    150
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Address the webhook server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            listen_addr: default_listen_addr(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl AppSettings {
    /// Parse the configured log level; unknown values fall back to INFO
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// API credentials for signed venue requests
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}
