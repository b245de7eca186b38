//! BybitWebhook - Main Entry Point
//!
//! Receives TradingView webhook signals and executes them as risk-sized
//! conditional orders on Bybit USDT perpetuals.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use bybit_webhook::bybit::BybitClient;
use bybit_webhook::config;
use bybit_webhook::executor::{Dispatcher, RedisContextStore};
use bybit_webhook::notify::{
    NoopLedger, NoopNotifier, Notifier, SheetLedger, TelegramNotifier, TradeLedger,
};
use bybit_webhook::server::{AppState, WebhookServer};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error; overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Address to bind the webhook server to (overrides config)
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = config::load_config(Some(&args.config))?;
    if let Some(level) = args.log_level {
        config.settings.log_level = level;
    }
    let listen_addr = args
        .listen
        .unwrap_or_else(|| config.settings.listen_addr.clone());

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.settings.tracing_level())
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting BybitWebhook");
    info!("Configuration file: {}", args.config);

    let gateway = Arc::new(BybitClient::with_timeout(
        &config.bybit,
        config.trading.pace_ms,
        Duration::from_secs(config.settings.request_timeout_seconds),
    )?);
    let store = Arc::new(RedisContextStore::connect(&config.redis).await?);

    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => Arc::new(TelegramNotifier::new(telegram)),
        None => {
            info!("no Telegram channel configured; notifications disabled");
            Arc::new(NoopNotifier)
        }
    };
    let ledger: Arc<dyn TradeLedger> = match &config.ledger {
        Some(ledger) => Arc::new(SheetLedger::new(ledger)),
        None => Arc::new(NoopLedger),
    };

    let dispatcher = Dispatcher::new(gateway, store, config.trading.risk_usd);
    let state = Arc::new(AppState {
        dispatcher,
        notifier: notifier.clone(),
        ledger,
    });

    notifier
        .notify(&format!("🚀 Bybit signal bot started on {}", listen_addr))
        .await;

    WebhookServer::new(state).serve(&listen_addr).await
}
