//! Durable trade-context store
//!
//! The store is the single source of truth correlating later signals to
//! their in-flight order/position. It must survive a redeploy, so the
//! production implementation persists to Redis; the in-memory variant is
//! the test seam.

use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::common::errors::Result;
use crate::common::types::{TradeContext, TradeKey};
use crate::config::types::RedisConfig;

/// Key-value contract for trade contexts.
///
/// Transport failures surface as `StoreUnavailable`; they are never
/// collapsed into "no active trade", which would make later signals
/// silently no-op against a live order.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn get(&self, key: &TradeKey) -> Result<Option<TradeContext>>;
    async fn put(&self, key: &TradeKey, ctx: &TradeContext) -> Result<()>;
    async fn remove(&self, key: &TradeKey) -> Result<()>;
}

/// Redis-backed store; contexts are JSON values under a `{prefix}:` key
pub struct RedisContextStore {
    conn: redis::aio::MultiplexedConnection,
    prefix: String,
}

impl RedisContextStore {
    /// Connect to Redis using the configured URL
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn,
            prefix: config.key_prefix.clone(),
        })
    }

    fn redis_key(&self, key: &TradeKey) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl ContextStore for RedisContextStore {
    async fn get(&self, key: &TradeKey) -> Result<Option<TradeContext>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.redis_key(key)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &TradeKey, ctx: &TradeContext) -> Result<()> {
        let json = serde_json::to_string(ctx)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(self.redis_key(key), json).await?;
        Ok(())
    }

    async fn remove(&self, key: &TradeKey) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.redis_key(key)).await?;
        Ok(())
    }
}

/// In-memory store used by tests
#[derive(Debug, Default)]
pub struct MemoryContextStore {
    entries: RwLock<HashMap<TradeKey, TradeContext>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn get(&self, key: &TradeKey) -> Result<Option<TradeContext>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &TradeKey, ctx: &TradeContext) -> Result<()> {
        self.entries.write().await.insert(key.clone(), ctx.clone());
        Ok(())
    }

    async fn remove(&self, key: &TradeKey) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Direction;
    use rust_decimal_macros::dec;

    fn sample_context(symbol: &str) -> TradeContext {
        TradeContext {
            order_id: "order-1".to_string(),
            symbol: symbol.to_string(),
            direction: Direction::Long,
            entry_price: "100.00".to_string(),
            stop_loss: "95.00".to_string(),
            take_profit: "110.00".to_string(),
            qty: dec!(0.2),
            pattern: "double_bottom".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryContextStore::new();
        let key = TradeKey::new("BTCUSDT", 1);

        assert!(store.get(&key).await.unwrap().is_none());

        let ctx = sample_context("BTCUSDT");
        store.put(&key, &ctx).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(ctx));

        store.remove(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let store = MemoryContextStore::new();
        let long_key = TradeKey::new("BTCUSDT", 1);
        let short_key = TradeKey::new("BTCUSDT", 2);

        store.put(&long_key, &sample_context("BTCUSDT")).await.unwrap();
        assert!(store.get(&short_key).await.unwrap().is_none());

        store.remove(&short_key).await.unwrap();
        assert!(store.get(&long_key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_removing_absent_key_is_a_noop() {
        let store = MemoryContextStore::new();
        store.remove(&TradeKey::new("ETHUSDT", 1)).await.unwrap();
    }

    #[test]
    fn test_context_json_round_trip() {
        let ctx = sample_context("BTCUSDT");
        let json = serde_json::to_string(&ctx).unwrap();
        let back: TradeContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }
}
