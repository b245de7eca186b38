//! Process-lifetime cache of per-symbol instrument rules

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::common::errors::Result;
use crate::common::traits::ExchangeGateway;
use crate::common::types::InstrumentRules;

/// Memoizes quantization rules per symbol.
///
/// Rules are immutable for the process lifetime; the venue never
/// invalidates them within a run, so there is no TTL and no eviction.
/// Two concurrent callers for the same uncached symbol may both issue the
/// fetch; the fetch is idempotent, so no single-flight is needed.
#[derive(Debug, Default)]
pub struct RulesCache {
    cache: RwLock<HashMap<String, InstrumentRules>>,
}

impl RulesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the rules for a symbol, fetching from the venue on first use
    pub async fn get(
        &self,
        gateway: &dyn ExchangeGateway,
        symbol: &str,
    ) -> Result<InstrumentRules> {
        if let Some(rules) = self.cache.read().await.get(symbol) {
            return Ok(rules.clone());
        }

        debug!("fetching instrument rules for {}", symbol);
        let rules = gateway.instrument_rules(symbol).await?;
        self.cache
            .write()
            .await
            .insert(symbol.to_string(), rules.clone());
        Ok(rules)
    }

    /// Number of cached symbols
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }
}
