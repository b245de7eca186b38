//! Append-only trade log backed by a spreadsheet webhook

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

use super::TradeLedger;
use crate::config::types::LedgerConfig;
use crate::executor::events::TradeLogRow;

/// POSTs each closed trade as a JSON row to a spreadsheet webhook
/// (e.g. a Google Apps Script web app appending to a sheet)
pub struct SheetLedger {
    client: Client,
    webhook_url: String,
}

impl SheetLedger {
    pub fn new(config: &LedgerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook_url: config.webhook_url.clone(),
        }
    }
}

#[async_trait]
impl TradeLedger for SheetLedger {
    async fn append(&self, row: &TradeLogRow) {
        match self.client.post(&self.webhook_url).json(row).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "ledger webhook rejected row");
            }
            Ok(_) => {}
            Err(e) => warn!("failed to append ledger row: {}", e),
        }
    }
}

/// Used when no ledger endpoint is configured
pub struct NoopLedger;

#[async_trait]
impl TradeLedger for NoopLedger {
    async fn append(&self, _row: &TradeLogRow) {}
}
