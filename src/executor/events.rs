//! Events emitted by the dispatcher
//!
//! Transition functions return event values instead of talking to the
//! notifier directly; the server layer translates them into Telegram
//! messages and ledger rows. This keeps the state machine testable
//! without a live chat or spreadsheet dependency.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::types::{CancelOutcome, Direction, TradeKey};

/// One row of the append-only trade log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLogRow {
    pub closed_at: DateTime<Utc>,
    pub symbol: String,
    pub slot: i32,
    pub direction: Direction,
    pub pattern: String,
    pub entry_price: String,
    pub close_price: String,
    pub qty: Decimal,
    pub pnl_percent: Decimal,
    pub pnl_usd: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

/// Outcome of one dispatched signal
#[derive(Debug, Clone, PartialEq)]
pub enum TradeEvent {
    /// Conditional entry order accepted by the venue
    ConditionalPlaced {
        key: TradeKey,
        order_id: String,
        qty: String,
        trigger_price: String,
        stop_loss: String,
        take_profit: String,
        pattern: String,
    },
    /// Invalidate arrived but no context exists; duplicate or already
    /// filled, not an error
    NothingToCancel { key: TradeKey },
    /// Pending order cancelled (or found already gone) and context cleared
    ConditionalCancelled {
        key: TradeKey,
        order_id: String,
        outcome: CancelOutcome,
    },
    /// Stop-loss/take-profit attached to the live position
    StopTargetAttached {
        key: TradeKey,
        stop_loss: String,
        take_profit: String,
    },
    /// Close-by-age found no live position; context cleared if present
    AlreadyFlat { key: TradeKey },
    /// Reduce-only close order submitted for the full live size
    CloseSubmitted { key: TradeKey, qty: String },
    /// Trade closed and P/L computed; the row goes to the ledger
    TradeLogged(TradeLogRow),
    /// Close report arrived but no context exists; nothing to log
    NothingToLog { key: TradeKey },
}
