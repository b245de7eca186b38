//! Bybit V5 wire message types

use serde::{Deserialize, Serialize};

/// Response envelope shared by all V5 endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
}

/// Venue code for "order does not exist or too late to cancel"
pub const RET_ORDER_NOT_EXISTS: i64 = 110001;

// ============================================================================
// Requests
// ============================================================================

/// Body for POST /v5/order/create
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub category: String,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub qty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_direction: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_order_type: Option<String>,
    pub position_idx: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
}

/// Body for POST /v5/order/cancel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    pub category: String,
    pub symbol: String,
    pub order_id: String,
}

/// Body for POST /v5/position/trading-stop
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingStopRequest {
    pub category: String,
    pub symbol: String,
    pub position_idx: i32,
    pub stop_loss: String,
    pub take_profit: String,
}

// ============================================================================
// Results
// ============================================================================

/// Result of order create/cancel calls
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResult {
    #[serde(rename = "orderId", default)]
    pub order_id: String,
    #[serde(rename = "orderLinkId", default)]
    pub order_link_id: String,
}

/// Result of GET /v5/market/instruments-info
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentsInfoResult {
    #[serde(default)]
    pub list: Vec<InstrumentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentEntry {
    pub symbol: String,
    pub lot_size_filter: LotSizeFilter,
    pub price_filter: PriceFilter,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    /// Quantity increment, as a decimal string
    pub qty_step: String,
    pub min_order_qty: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    pub tick_size: String,
}

/// Result of GET /v5/position/list
#[derive(Debug, Clone, Deserialize)]
pub struct PositionListResult {
    #[serde(default)]
    pub list: Vec<PositionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEntry {
    pub symbol: String,
    pub position_idx: i32,
    /// "Buy", "Sell", or "None" for a flat slot
    pub side: String,
    /// Position size as a decimal string; "0" when flat
    pub size: String,
}

/// Result of GET /v5/market/tickers
#[derive(Debug, Clone, Deserialize)]
pub struct TickersResult {
    #[serde(default)]
    pub list: Vec<TickerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerEntry {
    pub symbol: String,
    pub last_price: String,
}
