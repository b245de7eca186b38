//! Side-effect boundary: Telegram notifications and the trade ledger
//!
//! Both collaborators are best-effort and fire-and-forget; their failures
//! are logged and never abort signal processing.

pub mod ledger;
pub mod telegram;

use async_trait::async_trait;

use crate::common::types::CancelOutcome;
use crate::executor::events::{TradeEvent, TradeLogRow};

pub use ledger::{NoopLedger, SheetLedger};
pub use telegram::{NoopNotifier, TelegramNotifier};

/// Best-effort operator channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message; failures must not propagate to the caller
    async fn notify(&self, text: &str);
}

/// Best-effort append-only trade log
#[async_trait]
pub trait TradeLedger: Send + Sync {
    async fn append(&self, row: &TradeLogRow);
}

/// Render a dispatcher event as an operator message
pub fn render_event(event: &TradeEvent) -> String {
    match event {
        TradeEvent::ConditionalPlaced {
            key,
            order_id,
            qty,
            trigger_price,
            stop_loss,
            take_profit,
            pattern,
        } => format!(
            "✅ [{}] Conditional order placed ({}). ID: {}, qty {}, trigger {}, SL {}, TP {}",
            key, pattern, order_id, qty, trigger_price, stop_loss, take_profit
        ),
        TradeEvent::NothingToCancel { key } => {
            format!("[{}] No pending conditional order to cancel.", key)
        }
        TradeEvent::ConditionalCancelled {
            key,
            order_id,
            outcome,
        } => match outcome {
            CancelOutcome::Cancelled => {
                format!("🗑️ [{}] Cancelled conditional order. ID: {}", key, order_id)
            }
            CancelOutcome::AlreadyGone => format!(
                "🗑️ [{}] Order {} was already gone; cleared the stored trade.",
                key, order_id
            ),
        },
        TradeEvent::StopTargetAttached {
            key,
            stop_loss,
            take_profit,
        } => format!(
            "▶️ [{}] Position opened! SL: {}, TP: {}",
            key, stop_loss, take_profit
        ),
        TradeEvent::AlreadyFlat { key } => format!(
            "[{}] Tried to close an aged position, but none was found.",
            key
        ),
        TradeEvent::CloseSubmitted { key, qty } => {
            format!("⏱️ [{}] Position closed by age (qty {}).", key, qty)
        }
        TradeEvent::TradeLogged(row) => format!(
            "📊 [{}] {} trade closed at {}: {}% ({} USD)",
            row.symbol, row.direction, row.close_price, row.pnl_percent, row.pnl_usd
        ),
        TradeEvent::NothingToLog { key } => {
            format!("[{}] Close reported but no stored trade to log.", key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::TradeKey;

    #[test]
    fn test_render_cancelled_mentions_order_id() {
        let event = TradeEvent::ConditionalCancelled {
            key: TradeKey::new("BTCUSDT", 1),
            order_id: "abc-123".to_string(),
            outcome: CancelOutcome::Cancelled,
        };
        let text = render_event(&event);
        assert!(text.contains("BTCUSDT_1"));
        assert!(text.contains("abc-123"));
    }

    #[test]
    fn test_render_already_flat_is_calm() {
        let event = TradeEvent::AlreadyFlat {
            key: TradeKey::new("ETHUSDT", 2),
        };
        let text = render_event(&event);
        assert!(text.contains("none was found"));
    }
}
