//! Signal dispatcher and order-lifecycle state machine
//!
//! Per key the lifecycle is Idle -> PendingEntry (conditional order
//! placed, context stored) -> Open (position live, stop/target attached)
//! -> Idle (closed, context removed). The context store is the single
//! source of truth and is re-read immediately before each mutation, so
//! duplicate or out-of-order signals degrade to no-ops instead of faults.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::events::{TradeEvent, TradeLogRow};
use super::quantize::{quantize_price, quantize_qty};
use super::rules::RulesCache;
use super::sizing;
use super::store::ContextStore;
use crate::common::errors::{BotError, Result};
use crate::common::traits::ExchangeGateway;
use crate::common::types::{OrderRequest, Signal, SignalAction, TradeContext, TradeKey};

/// Routes a validated signal through the matching transition
pub struct Dispatcher {
    gateway: Arc<dyn ExchangeGateway>,
    store: Arc<dyn ContextStore>,
    rules: RulesCache,
    risk_usd: Decimal,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        store: Arc<dyn ContextStore>,
        risk_usd: Decimal,
    ) -> Self {
        Self {
            gateway,
            store,
            rules: RulesCache::new(),
            risk_usd,
        }
    }

    /// Process one signal end-to-end and return the resulting events
    #[instrument(skip(self, signal), fields(action = %signal.action, symbol = %signal.symbol, slot = signal.slot))]
    pub async fn dispatch(&self, signal: &Signal) -> Result<Vec<TradeEvent>> {
        match signal.action {
            SignalAction::NewPattern => self.open_conditional(signal).await,
            SignalAction::InvalidatePattern => self.invalidate(signal).await,
            SignalAction::EnteredPosition => self.confirm_entry(signal).await,
            SignalAction::CloseByAge => self.close_by_age(signal).await,
            SignalAction::TradeClosed => self.report_closed(signal).await,
        }
    }

    /// Idle -> PendingEntry: size, quantize, and submit the conditional
    /// entry order, then record the context.
    async fn open_conditional(&self, signal: &Signal) -> Result<Vec<TradeEvent>> {
        let direction = require(signal.direction, "direction")?;
        let entry = require(signal.entry_price, "entryPrice")?;
        let take_profit = require(signal.take_profit, "takeProfit")?;
        let key = signal.key();

        // An occupied key is never overwritten; the sender must invalidate
        // the old pattern first.
        if self.store.get(&key).await?.is_some() {
            return Err(BotError::SlotOccupied {
                key: key.to_string(),
            });
        }

        let rules = self.rules.get(self.gateway.as_ref(), &signal.symbol).await?;

        let stop_loss = signal
            .stop_loss
            .unwrap_or_else(|| sizing::stop_from_target(direction, entry, take_profit));
        let stop_distance = (entry - stop_loss).abs();
        let raw_qty = sizing::size(self.risk_usd, entry, stop_distance)?;

        let qty = quantize_qty(raw_qty, rules.qty_step);
        let qty_value: Decimal = qty
            .parse()
            .map_err(|_| BotError::Internal(format!("bad quantized qty: {}", qty)))?;
        if qty_value < rules.min_qty {
            return Err(BotError::QtyBelowMinimum {
                symbol: signal.symbol.clone(),
                qty,
                min_qty: rules.min_qty.to_string(),
            });
        }

        let trigger = signal.trigger_price.unwrap_or(entry);
        let order = OrderRequest {
            symbol: signal.symbol.clone(),
            side: direction.entry_side(),
            qty: qty.clone(),
            trigger_price: Some(quantize_price(trigger, rules.price_tick)),
            trigger_direction: Some(direction.trigger_direction()),
            slot: signal.slot,
            reduce_only: false,
        };

        // Venue rejection propagates here with no state change
        let ack = self.gateway.submit_order(&order).await?;
        info!(order_id = %ack.order_id, "conditional order placed");

        let context = TradeContext {
            order_id: ack.order_id.clone(),
            symbol: signal.symbol.clone(),
            direction,
            entry_price: quantize_price(entry, rules.price_tick),
            stop_loss: quantize_price(stop_loss, rules.price_tick),
            take_profit: quantize_price(take_profit, rules.price_tick),
            qty: qty_value,
            pattern: signal.pattern.clone().unwrap_or_default(),
            created_at: Utc::now(),
        };
        self.store.put(&key, &context).await?;

        Ok(vec![TradeEvent::ConditionalPlaced {
            key,
            order_id: ack.order_id,
            qty,
            trigger_price: context.entry_price.clone(),
            stop_loss: context.stop_loss.clone(),
            take_profit: context.take_profit.clone(),
            pattern: context.pattern.clone(),
        }])
    }

    /// PendingEntry -> Idle: cancel the stored order and clear the context.
    /// An absent context means the order already filled or was cancelled;
    /// that is a notice, not an error.
    async fn invalidate(&self, signal: &Signal) -> Result<Vec<TradeEvent>> {
        let key = signal.key();
        let context = match self.store.get(&key).await? {
            Some(ctx) => ctx,
            None => return Ok(vec![TradeEvent::NothingToCancel { key }]),
        };

        // Errors other than "order not exists" keep the context so a retry
        // signal can find it again.
        let outcome = self
            .gateway
            .cancel_order(&signal.symbol, &context.order_id)
            .await?;

        self.store.remove(&key).await?;
        info!(order_id = %context.order_id, ?outcome, "conditional order cancelled");

        Ok(vec![TradeEvent::ConditionalCancelled {
            key,
            order_id: context.order_id,
            outcome,
        }])
    }

    /// PendingEntry -> Open: attach stop/target to the now-live position.
    /// The context stays alive; it is still needed to compute P/L on close.
    async fn confirm_entry(&self, signal: &Signal) -> Result<Vec<TradeEvent>> {
        let key = signal.key();
        let context = self.store.get(&key).await?;

        let (stop_loss, take_profit) = match (signal.stop_loss, signal.take_profit) {
            (Some(sl), Some(tp)) => {
                // The position is already live at this point: a failure to
                // even resolve formatting rules leaves it unprotected.
                let rules = self
                    .rules
                    .get(self.gateway.as_ref(), &signal.symbol)
                    .await
                    .map_err(|e| BotError::PartialFailure {
                        symbol: signal.symbol.clone(),
                        reason: e.to_string(),
                    })?;
                (
                    quantize_price(sl, rules.price_tick),
                    quantize_price(tp, rules.price_tick),
                )
            }
            _ => match &context {
                Some(ctx) => (ctx.stop_loss.clone(), ctx.take_profit.clone()),
                None => {
                    return Err(BotError::Validation(
                        "entry confirmation without stopLoss/takeProfit and no stored trade"
                            .to_string(),
                    ))
                }
            },
        };

        self.gateway
            .set_trading_stop(&signal.symbol, signal.slot, &stop_loss, &take_profit)
            .await
            .map_err(|e| BotError::PartialFailure {
                symbol: signal.symbol.clone(),
                reason: e.to_string(),
            })?;
        info!(%stop_loss, %take_profit, "stop/target attached");

        Ok(vec![TradeEvent::StopTargetAttached {
            key,
            stop_loss,
            take_profit,
        }])
    }

    /// Open -> Idle on the time boundary: close the full live position
    /// with a reduce-only market order, then log with the latest ticker
    /// price (the close fill price is not known synchronously).
    async fn close_by_age(&self, signal: &Signal) -> Result<Vec<TradeEvent>> {
        let key = signal.key();

        let position = match self.gateway.position(&signal.symbol, signal.slot).await? {
            Some(pos) => pos,
            None => {
                // Already closed out-of-band; clear any leftover context
                self.store.remove(&key).await?;
                return Ok(vec![TradeEvent::AlreadyFlat { key }]);
            }
        };

        // Full live size, not the originally computed quantity: partial
        // fills may have changed it.
        let qty = position.size.normalize().to_string();
        let order = OrderRequest {
            symbol: signal.symbol.clone(),
            side: position.side.opposite(),
            qty: qty.clone(),
            trigger_price: None,
            trigger_direction: None,
            slot: signal.slot,
            reduce_only: true,
        };
        self.gateway.submit_order(&order).await?;
        info!(%qty, "reduce-only close submitted");

        let mut events = vec![TradeEvent::CloseSubmitted {
            key: key.clone(),
            qty,
        }];

        let context = match self.store.get(&key).await? {
            Some(ctx) => ctx,
            None => {
                events.push(TradeEvent::NothingToLog { key });
                return Ok(events);
            }
        };

        match self.gateway.last_price(&signal.symbol).await {
            Ok(close_price) => {
                events.push(
                    self.log_closed(&key, context, close_price, Some("closed_by_age".to_string()))
                        .await?,
                );
            }
            Err(e) => {
                // The position is closed either way; skip the log row
                // rather than leaving the key occupied forever.
                warn!("close price unavailable, skipping log row: {}", e);
                self.store.remove(&key).await?;
            }
        }

        Ok(events)
    }

    /// Open -> Idle on an explicit outcome report: compute P/L, emit the
    /// ledger row, clear the context.
    async fn report_closed(&self, signal: &Signal) -> Result<Vec<TradeEvent>> {
        let key = signal.key();
        let context = match self.store.get(&key).await? {
            Some(ctx) => ctx,
            None => return Ok(vec![TradeEvent::NothingToLog { key }]),
        };

        let close_price = require(signal.close_price, "closePrice")?;
        let event = self
            .log_closed(&key, context, close_price, signal.outcome.clone())
            .await?;
        Ok(vec![event])
    }

    async fn log_closed(
        &self,
        key: &TradeKey,
        context: TradeContext,
        close_price: Decimal,
        outcome: Option<String>,
    ) -> Result<TradeEvent> {
        let entry: Decimal = context.entry_price.parse().map_err(|_| {
            BotError::Internal(format!("stored entry price unparseable: {}", context.entry_price))
        })?;

        let row = TradeLogRow {
            closed_at: Utc::now(),
            symbol: context.symbol.clone(),
            slot: key.slot,
            direction: context.direction,
            pattern: context.pattern.clone(),
            entry_price: context.entry_price.clone(),
            close_price: close_price.to_string(),
            qty: context.qty,
            pnl_percent: sizing::pnl_percent(context.direction, entry, close_price).round_dp(2),
            pnl_usd: sizing::pnl_usd(context.direction, entry, close_price, context.qty)
                .round_dp(4),
            outcome,
        };

        self.store.remove(key).await?;
        info!(pnl_percent = %row.pnl_percent, "trade closed and logged");
        Ok(TradeEvent::TradeLogged(row))
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| BotError::Validation(format!("missing {}", field)))
}
