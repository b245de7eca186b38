//! Common test utilities and fixtures

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Mutex;

use bybit_webhook::common::errors::{BotError, Result};
use bybit_webhook::common::traits::ExchangeGateway;
use bybit_webhook::common::types::{
    CancelOutcome, InstrumentRules, OrderAck, OrderRequest, PositionInfo, TradeContext, TradeKey,
};
use bybit_webhook::executor::{ContextStore, TradeLogRow};
use bybit_webhook::notify::{Notifier, TradeLedger};

/// Instrument rules matching the worked sizing example:
/// step 0.1, min 0.1, tick 0.01
pub fn btc_rules() -> InstrumentRules {
    InstrumentRules {
        symbol: "BTCUSDT".to_string(),
        qty_step: dec!(0.1),
        min_qty: dec!(0.1),
        price_tick: dec!(0.01),
    }
}

/// Scripted exchange gateway that records every call
pub struct StubGateway {
    pub rules: InstrumentRules,
    /// When set, submit_order fails with this venue rejection
    pub reject_submit: Option<(i64, String)>,
    /// Live position returned by position(); None means flat
    pub live_position: Option<PositionInfo>,
    pub last_price: Decimal,
    pub submitted: Mutex<Vec<OrderRequest>>,
    pub cancelled: Mutex<Vec<String>>,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self {
            rules: btc_rules(),
            reject_submit: None,
            live_position: None,
            last_price: dec!(100),
            submitted: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ExchangeGateway for StubGateway {
    async fn instrument_rules(&self, _symbol: &str) -> Result<InstrumentRules> {
        Ok(self.rules.clone())
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        self.submitted.lock().unwrap().push(order.clone());
        if let Some((code, message)) = &self.reject_submit {
            return Err(BotError::VenueRejection {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(OrderAck {
            order_id: format!("stub-order-{}", self.submitted.lock().unwrap().len()),
        })
    }

    async fn cancel_order(&self, _symbol: &str, order_id: &str) -> Result<CancelOutcome> {
        self.cancelled.lock().unwrap().push(order_id.to_string());
        Ok(CancelOutcome::Cancelled)
    }

    async fn position(&self, _symbol: &str, _slot: i32) -> Result<Option<PositionInfo>> {
        Ok(self.live_position.clone())
    }

    async fn set_trading_stop(
        &self,
        _symbol: &str,
        _slot: i32,
        _stop_loss: &str,
        _take_profit: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn last_price(&self, _symbol: &str) -> Result<Decimal> {
        Ok(self.last_price)
    }
}

/// Store whose transport is down; every call fails
pub struct FailingStore;

#[async_trait]
impl ContextStore for FailingStore {
    async fn get(&self, _key: &TradeKey) -> Result<Option<TradeContext>> {
        Err(BotError::StoreUnavailable("connection refused".to_string()))
    }

    async fn put(&self, _key: &TradeKey, _ctx: &TradeContext) -> Result<()> {
        Err(BotError::StoreUnavailable("connection refused".to_string()))
    }

    async fn remove(&self, _key: &TradeKey) -> Result<()> {
        Err(BotError::StoreUnavailable("connection refused".to_string()))
    }
}

/// Notifier that records messages instead of sending them
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

/// Ledger that records rows instead of posting them
#[derive(Default)]
pub struct RecordingLedger {
    pub rows: Mutex<Vec<TradeLogRow>>,
}

#[async_trait]
impl TradeLedger for RecordingLedger {
    async fn append(&self, row: &TradeLogRow) {
        self.rows.lock().unwrap().push(row.clone());
    }
}

/// Sample webhook payloads
pub mod payloads {
    /// A new-pattern signal matching the worked sizing example
    pub const NEW_PATTERN: &str = r#"{
        "action": "NEW_PATTERN",
        "ticker": "BTCUSDT.P",
        "positionIdx": 1,
        "direction": "long",
        "entryPrice": "100",
        "takeProfit": "110",
        "patternLabel": "double_bottom"
    }"#;

    pub const INVALIDATE: &str = r#"{
        "action": "INVALIDATE_PATTERN",
        "ticker": "BTCUSDT.P",
        "positionIdx": 1
    }"#;

    pub const TRADE_CLOSED: &str = r#"{
        "action": "TRADE_CLOSED",
        "ticker": "BTCUSDT.P",
        "positionIdx": 1,
        "closePrice": "110",
        "outcome": "take_profit"
    }"#;

    /// Alert without an action tag; shared alert sources emit these
    pub const NO_ACTION: &str = r#"{"ticker": "BTCUSDT.P", "text": "price crossed 100"}"#;
}
