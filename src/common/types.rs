//! Unified types shared across the signal pipeline

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trade direction as reported by the alert source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Venue order side that opens a position in this direction
    pub fn entry_side(&self) -> Side {
        match self {
            Direction::Long => Side::Buy,
            Direction::Short => Side::Sell,
        }
    }

    /// Bybit trigger direction: 1 = triggered when price rises to the
    /// trigger, 2 = triggered when price falls to it.
    pub fn trigger_direction(&self) -> i32 {
        match self {
            Direction::Long => 1,
            Direction::Short => 2,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "long" => Some(Direction::Long),
            "short" => Some(Direction::Short),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Order side in venue terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// Composite key correlating signals to their in-flight trade.
///
/// Rendered as `"{symbol}_{slot}"`; the slot is the venue-side positionIdx
/// distinguishing long/short legs under hedge-mode accounting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradeKey {
    pub symbol: String,
    pub slot: i32,
}

impl TradeKey {
    pub fn new(symbol: impl Into<String>, slot: i32) -> Self {
        Self {
            symbol: symbol.into(),
            slot,
        }
    }
}

impl std::fmt::Display for TradeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.symbol, self.slot)
    }
}

/// Per-symbol quantization rules fetched from the venue.
///
/// Immutable once fetched; cached for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRules {
    pub symbol: String,
    /// Smallest allowed quantity increment
    pub qty_step: Decimal,
    /// Smallest allowed order quantity
    pub min_qty: Decimal,
    /// Smallest allowed price increment
    pub price_tick: Decimal,
}

/// Durable record correlating a (symbol, slot) key to its in-flight
/// order/position. Owned exclusively by the context store; replaced on
/// write, deleted on close/cancel, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeContext {
    pub order_id: String,
    pub symbol: String,
    pub direction: Direction,
    /// Venue-formatted prices, exactly as submitted
    pub entry_price: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub qty: Decimal,
    pub pattern: String,
    pub created_at: DateTime<Utc>,
}

/// Action tag of an inbound signal.
///
/// The aliases cover every spelling the alert source has used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    NewPattern,
    InvalidatePattern,
    EnteredPosition,
    CloseByAge,
    TradeClosed,
}

impl SignalAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW_PATTERN" | "OPEN_CONDITIONAL" => Some(SignalAction::NewPattern),
            "INVALIDATE_PATTERN" | "CANCEL_CONDITIONAL" | "CANCEL_PENDING" => {
                Some(SignalAction::InvalidatePattern)
            }
            "ENTERED_POSITION" | "SET_SL_TP" => Some(SignalAction::EnteredPosition),
            "CLOSE_BY_AGE" => Some(SignalAction::CloseByAge),
            "TRADE_CLOSED" => Some(SignalAction::TradeClosed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalAction::NewPattern => "NEW_PATTERN",
            SignalAction::InvalidatePattern => "INVALIDATE_PATTERN",
            SignalAction::EnteredPosition => "ENTERED_POSITION",
            SignalAction::CloseByAge => "CLOSE_BY_AGE",
            SignalAction::TradeClosed => "TRADE_CLOSED",
        };
        write!(f, "{}", name)
    }
}

/// Validated and normalized inbound signal.
///
/// The raw webhook body is untrusted JSON from a shared alert source;
/// numeric fields may arrive as strings or numbers and are tolerated
/// either way.
#[derive(Debug, Clone)]
pub struct Signal {
    pub action: SignalAction,
    /// Ticker with the TradingView `.P` perpetual suffix stripped
    pub symbol: String,
    pub slot: i32,
    pub direction: Option<Direction>,
    pub entry_price: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub close_price: Option<Decimal>,
    pub outcome: Option<String>,
    pub pattern: Option<String>,
}

impl Signal {
    /// Parse a raw webhook body. `Err` carries the reason the payload is
    /// ignored; incomplete payloads from a shared alert source are
    /// expected and never treated as faults.
    pub fn from_value(body: &Value) -> std::result::Result<Self, String> {
        let action_str = match body.get("action").and_then(Value::as_str) {
            Some(a) => a,
            None => return Err("no action field".to_string()),
        };
        let action = match SignalAction::parse(action_str) {
            Some(a) => a,
            None => return Err(format!("unrecognized action '{}'", action_str)),
        };

        let ticker = match body.get("ticker").and_then(Value::as_str) {
            Some(t) if !t.is_empty() => t,
            _ => return Err("no ticker field".to_string()),
        };
        let symbol = ticker.trim_end_matches(".P").to_string();

        let slot = int_field(body, "positionIdx").unwrap_or(0);
        let direction = body
            .get("direction")
            .and_then(Value::as_str)
            .and_then(Direction::parse);

        Ok(Self {
            action,
            symbol,
            slot,
            direction,
            entry_price: decimal_field(body, "entryPrice"),
            stop_loss: decimal_field(body, "stopLoss"),
            take_profit: decimal_field(body, "takeProfit"),
            trigger_price: decimal_field(body, "triggerPrice"),
            close_price: decimal_field(body, "closePrice"),
            outcome: string_field(body, "outcome"),
            pattern: string_field(body, "patternLabel"),
        })
    }

    pub fn key(&self) -> TradeKey {
        TradeKey::new(self.symbol.clone(), self.slot)
    }
}

/// Extract a decimal that may be encoded as a JSON string or number
fn decimal_field(body: &Value, key: &str) -> Option<Decimal> {
    match body.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn int_field(body: &Value, key: &str) -> Option<i32> {
    match body.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().map(|v| v as i32),
        _ => None,
    }
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// Order parameters handed to the exchange gateway
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    /// Venue-formatted quantity string
    pub qty: String,
    /// Conditional trigger price; None for plain market orders
    pub trigger_price: Option<String>,
    pub trigger_direction: Option<i32>,
    pub slot: i32,
    pub reduce_only: bool,
}

/// Acknowledgement of a successfully submitted order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
}

/// Outcome of a cancellation request.
///
/// The venue answers "order not exists" for orders that already filled or
/// were cancelled out-of-band; both count as the order being gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyGone,
}

/// Live position as reported by the venue
#[derive(Debug, Clone, PartialEq)]
pub struct PositionInfo {
    pub symbol: String,
    pub slot: i32,
    pub side: Side,
    pub size: Decimal,
}
