//! BybitWebhook Library
//!
//! A Rust service that receives TradingView webhook signals and executes
//! them as risk-sized conditional orders on Bybit USDT perpetuals,
//! tracking each trade's lifecycle in a durable Redis store.

pub mod bybit;
pub mod common;
pub mod config;
pub mod executor;
pub mod notify;
pub mod server;

// Re-export commonly used types
pub use common::errors::{BotError, Result};
pub use common::traits::ExchangeGateway;
pub use common::types::{
    CancelOutcome, Direction, InstrumentRules, OrderAck, OrderRequest, PositionInfo, Side, Signal,
    SignalAction, TradeContext, TradeKey,
};
pub use config::types::AppConfig;
pub use bybit::BybitClient;

// Executor types
pub use executor::{
    ContextStore, Dispatcher, MemoryContextStore, RedisContextStore, RulesCache, TradeEvent,
    TradeLogRow,
};

// Notification layer
pub use notify::{render_event, Notifier, TradeLedger};
pub use server::{AppState, WebhookServer};
