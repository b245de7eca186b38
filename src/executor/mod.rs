//! Signal execution core
//!
//! ```text
//! inbound signal
//!       │
//!       ▼
//!  Dispatcher ──── RulesCache ──► venue (instrument rules, cached)
//!       │
//!       ├── sizing + quantize ──► venue-legal order parameters
//!       │
//!       ├── ExchangeGateway ───► order submit / cancel / stops / close
//!       │
//!       └── ContextStore ──────► durable (symbol, slot) → TradeContext
//!
//!  dispatch() returns TradeEvents; the server layer turns them into
//!  notifications and ledger rows.
//! ```

pub mod dispatcher;
pub mod events;
pub mod quantize;
pub mod rules;
pub mod sizing;
pub mod store;

pub use dispatcher::Dispatcher;
pub use events::{TradeEvent, TradeLogRow};
pub use quantize::{quantize_price, quantize_qty};
pub use rules::RulesCache;
pub use store::{ContextStore, MemoryContextStore, RedisContextStore};
