//! REST client for the Bybit V5 API

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use super::auth::generate_auth_headers;
use super::messages::*;
use crate::common::errors::{BotError, Result};
use crate::common::traits::ExchangeGateway;
use crate::common::types::{
    CancelOutcome, InstrumentRules, OrderAck, OrderRequest, PositionInfo, Side,
};
use crate::config::types::{ApiCredentials, BybitConfig};

/// All orders go to the USDT-perpetual book
const CATEGORY: &str = "linear";

/// Spaces venue calls at a fixed minimum interval to stay under the
/// request-rate ceiling. Callers queue on the mutex and drain
/// sequentially; there is no retry and no mid-flight cancellation.
#[derive(Debug)]
struct RequestPacer {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RequestPacer {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    async fn pace(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let earliest = prev + self.min_interval;
            let now = Instant::now();
            if earliest > now {
                tokio::time::sleep(earliest - now).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// REST client for Bybit V5, paced to the venue request-rate ceiling
#[derive(Debug)]
pub struct BybitClient {
    client: Client,
    base_url: String,
    credentials: Option<ApiCredentials>,
    recv_window_ms: u64,
    pacer: RequestPacer,
}

impl BybitClient {
    /// Create a new client from configuration
    pub fn new(config: &BybitConfig, pace_ms: u64) -> Result<Self> {
        Self::with_timeout(config, pace_ms, Duration::from_secs(30))
    }

    /// Create a new client with a custom request timeout
    pub fn with_timeout(config: &BybitConfig, pace_ms: u64, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(e.to_string()))?;

        let credentials = match (&config.api_key, &config.api_secret) {
            (Some(key), Some(secret)) => Some(ApiCredentials::new(key.clone(), secret.clone())),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: config.rest_url.trim_end_matches('/').to_string(),
            credentials,
            recv_window_ms: config.recv_window_ms,
            pacer: RequestPacer::new(Duration::from_millis(pace_ms)),
        })
    }

    fn credentials(&self) -> Result<&ApiCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| BotError::Configuration("Bybit API credentials not set".to_string()))
    }

    /// Signed GET; `query` is the already-encoded query string
    async fn get_signed<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        self.pacer.pace().await;

        let creds = self.credentials()?;
        let headers =
            generate_auth_headers(&creds.api_key, &creds.api_secret, self.recv_window_ms, query)?;

        let url = format!("{}{}?{}", self.base_url, path, query);
        debug!("GET {}", url);
        let response = headers.apply_to_request(self.client.get(&url)).send().await?;

        Self::parse_envelope(response).await
    }

    /// Unsigned GET for public market-data endpoints
    async fn get_public<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        self.pacer.pace().await;

        let url = format!("{}{}?{}", self.base_url, path, query);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        Self::parse_envelope(response).await
    }

    /// Signed POST with a JSON body
    async fn post_signed<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>> {
        self.pacer.pace().await;

        let creds = self.credentials()?;
        let body_json = serde_json::to_string(body)?;
        let headers = generate_auth_headers(
            &creds.api_key,
            &creds.api_secret,
            self.recv_window_ms,
            &body_json,
        )?;

        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = headers
            .apply_to_request(self.client.post(&url))
            .header("Content-Type", "application/json")
            .body(body_json)
            .send()
            .await?;

        Self::raw_envelope(response).await
    }

    /// Read the envelope and fail on a non-zero retCode
    async fn parse_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let envelope: ApiEnvelope<T> = Self::raw_envelope(response).await?;
        Self::check_envelope(envelope)
    }

    /// Read the envelope without interpreting retCode (cancel needs the
    /// raw code to map "order not exists" to success)
    async fn raw_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }
        Ok(response.json().await?)
    }

    fn check_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T> {
        if envelope.ret_code != 0 {
            return Err(BotError::VenueRejection {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }
        envelope
            .result
            .ok_or_else(|| BotError::InvalidResponse("missing result in response".to_string()))
    }
}

#[async_trait]
impl ExchangeGateway for BybitClient {
    #[instrument(skip(self))]
    async fn instrument_rules(&self, symbol: &str) -> Result<InstrumentRules> {
        let query = format!("category={}&symbol={}", CATEGORY, symbol);
        let result: InstrumentsInfoResult = self
            .get_public("/v5/market/instruments-info", &query)
            .await
            .map_err(|e| BotError::RulesUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let entry = result
            .list
            .into_iter()
            .find(|i| i.symbol == symbol)
            .ok_or_else(|| BotError::RulesUnavailable {
                symbol: symbol.to_string(),
                reason: "symbol not listed".to_string(),
            })?;

        let parse = |name: &str, value: &str| -> Result<Decimal> {
            value.parse().map_err(|_| BotError::RulesUnavailable {
                symbol: symbol.to_string(),
                reason: format!("unparseable {}: {}", name, value),
            })
        };

        Ok(InstrumentRules {
            symbol: entry.symbol,
            qty_step: parse("qtyStep", &entry.lot_size_filter.qty_step)?,
            min_qty: parse("minOrderQty", &entry.lot_size_filter.min_order_qty)?,
            price_tick: parse("tickSize", &entry.price_filter.tick_size)?,
        })
    }

    #[instrument(skip(self, order), fields(symbol = %order.symbol, side = %order.side))]
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let request = CreateOrderRequest {
            category: CATEGORY.to_string(),
            symbol: order.symbol.clone(),
            side: order.side.to_string(),
            order_type: "Market".to_string(),
            qty: order.qty.clone(),
            trigger_price: order.trigger_price.clone(),
            trigger_direction: order.trigger_direction,
            stop_order_type: order.trigger_price.as_ref().map(|_| "Market".to_string()),
            position_idx: order.slot,
            reduce_only: order.reduce_only.then_some(true),
        };

        let envelope: ApiEnvelope<OrderResult> =
            self.post_signed("/v5/order/create", &request).await?;
        let result = Self::check_envelope(envelope)?;

        Ok(OrderAck {
            order_id: result.order_id,
        })
    }

    #[instrument(skip(self))]
    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<CancelOutcome> {
        let request = CancelOrderRequest {
            category: CATEGORY.to_string(),
            symbol: symbol.to_string(),
            order_id: order_id.to_string(),
        };

        let envelope: ApiEnvelope<OrderResult> =
            self.post_signed("/v5/order/cancel", &request).await?;

        match envelope.ret_code {
            0 => Ok(CancelOutcome::Cancelled),
            RET_ORDER_NOT_EXISTS => Ok(CancelOutcome::AlreadyGone),
            code => Err(BotError::VenueRejection {
                code,
                message: envelope.ret_msg,
            }),
        }
    }

    #[instrument(skip(self))]
    async fn position(&self, symbol: &str, slot: i32) -> Result<Option<PositionInfo>> {
        let query = format!("category={}&symbol={}", CATEGORY, symbol);
        let result: PositionListResult = self.get_signed("/v5/position/list", &query).await?;

        for entry in result.list {
            if entry.position_idx != slot {
                continue;
            }
            let size: Decimal = entry.size.parse().map_err(|_| {
                BotError::InvalidResponse(format!("unparseable position size: {}", entry.size))
            })?;
            if size <= Decimal::ZERO {
                continue;
            }
            let side = match entry.side.as_str() {
                "Buy" => Side::Buy,
                "Sell" => Side::Sell,
                other => {
                    return Err(BotError::InvalidResponse(format!(
                        "unexpected position side: {}",
                        other
                    )))
                }
            };
            return Ok(Some(PositionInfo {
                symbol: entry.symbol,
                slot: entry.position_idx,
                side,
                size,
            }));
        }

        Ok(None)
    }

    #[instrument(skip(self))]
    async fn set_trading_stop(
        &self,
        symbol: &str,
        slot: i32,
        stop_loss: &str,
        take_profit: &str,
    ) -> Result<()> {
        let request = TradingStopRequest {
            category: CATEGORY.to_string(),
            symbol: symbol.to_string(),
            position_idx: slot,
            stop_loss: stop_loss.to_string(),
            take_profit: take_profit.to_string(),
        };

        let envelope: ApiEnvelope<serde_json::Value> = self
            .post_signed("/v5/position/trading-stop", &request)
            .await?;
        if envelope.ret_code != 0 {
            return Err(BotError::VenueRejection {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn last_price(&self, symbol: &str) -> Result<Decimal> {
        let query = format!("category={}&symbol={}", CATEGORY, symbol);
        let result: TickersResult = self.get_public("/v5/market/tickers", &query).await?;

        let entry = result
            .list
            .into_iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| {
                BotError::InvalidResponse(format!("no ticker data for {}", symbol))
            })?;

        entry.last_price.parse().map_err(|_| {
            BotError::InvalidResponse(format!("unparseable last price: {}", entry.last_price))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::BybitConfig;

    fn test_config() -> BybitConfig {
        BybitConfig {
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            rest_url: "https://api.bybit.com/".to_string(),
            recv_window_ms: 5000,
        }
    }

    #[test]
    fn test_client_creation_normalizes_url() {
        let client = BybitClient::new(&test_config(), 150).unwrap();
        assert!(!client.base_url.ends_with('/'));
    }

    #[test]
    fn test_client_without_credentials() {
        let config = BybitConfig::default();
        let client = BybitClient::new(&config, 150).unwrap();
        assert!(client.credentials().is_err());
    }

    #[tokio::test]
    async fn test_pacer_enforces_interval() {
        let pacer = RequestPacer::new(Duration::from_millis(30));
        let start = Instant::now();
        pacer.pace().await;
        pacer.pace().await;
        pacer.pace().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
