//! Trait definitions for the exchange gateway

use async_trait::async_trait;

use super::errors::Result;
use super::types::{CancelOutcome, InstrumentRules, OrderAck, OrderRequest, PositionInfo};
use rust_decimal::Decimal;

/// Contract consumed by the dispatcher for all venue interaction.
///
/// The production implementation is [`crate::bybit::BybitClient`]; tests
/// substitute mocks. Every method maps to a single REST round-trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Fetch quantization rules for a symbol.
    ///
    /// Fails with `RulesUnavailable` when the venue errors or returns no
    /// data for the symbol.
    async fn instrument_rules(&self, symbol: &str) -> Result<InstrumentRules>;

    /// Submit an order. Venue rejections surface as `VenueRejection`
    /// with the original code and message.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck>;

    /// Cancel an order by id.
    ///
    /// "Order does not exist" venue responses are reported as
    /// [`CancelOutcome::AlreadyGone`], not as errors: the order already
    /// filled or was cancelled out-of-band.
    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<CancelOutcome>;

    /// Look up the live position at (symbol, slot); `None` when the venue
    /// reports no open size there.
    async fn position(&self, symbol: &str, slot: i32) -> Result<Option<PositionInfo>>;

    /// Attach stop-loss/take-profit to an already-open position.
    async fn set_trading_stop(
        &self,
        symbol: &str,
        slot: i32,
        stop_loss: &str,
        take_profit: &str,
    ) -> Result<()>;

    /// Latest traded price for a symbol.
    async fn last_price(&self, symbol: &str) -> Result<Decimal>;
}
