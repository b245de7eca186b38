//! Webhook handlers
//!
//! The alert source is shared with other consumers, so incomplete or
//! unrecognized payloads are expected traffic: they are acknowledged with
//! a 200 "ignored" status and never alarm the operator channel. Genuine
//! faults answer 500 and are pushed to the notifier; no fault crashes the
//! process.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::AppState;
use crate::common::errors::BotError;
use crate::common::types::Signal;
use crate::executor::TradeEvent;
use crate::notify::render_event;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    fn ignored(message: String) -> (StatusCode, Json<Self>) {
        (
            StatusCode::OK,
            Json(Self {
                status: "ignored",
                message: Some(message),
                error: None,
            }),
        )
    }

    fn success(message: String) -> (StatusCode, Json<Self>) {
        (
            StatusCode::OK,
            Json(Self {
                status: "success",
                message: Some(message),
                error: None,
            }),
        )
    }

    fn rejected(message: String) -> (StatusCode, Json<Self>) {
        (
            StatusCode::OK,
            Json(Self {
                status: "rejected",
                message: Some(message),
                error: None,
            }),
        )
    }

    fn fault(error: String) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                status: "error",
                message: None,
                error: Some(error),
            }),
        )
    }
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Process one inbound alert
pub async fn handle_signal(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<WebhookResponse>) {
    let signal = match Signal::from_value(&body) {
        Ok(signal) => signal,
        Err(reason) => {
            info!("ignoring payload: {}", reason);
            return WebhookResponse::ignored(reason);
        }
    };

    info!(action = %signal.action, symbol = %signal.symbol, slot = signal.slot, "signal received");

    match state.dispatcher.dispatch(&signal).await {
        Ok(events) => {
            publish_events(&state, &events).await;
            WebhookResponse::success(format!("Action '{}' processed.", signal.action))
        }
        Err(BotError::Validation(reason)) => {
            info!("ignoring incomplete signal: {}", reason);
            WebhookResponse::ignored(reason)
        }
        Err(e) if e.is_trade_rejection() => {
            warn!("trade rejected: {}", e);
            state.notifier.notify(&format!("⚠️ {}", e)).await;
            WebhookResponse::rejected(e.to_string())
        }
        Err(e) => {
            error!("signal processing failed: {}", e);
            let prefix = if e.is_critical() { "🚨" } else { "❌ ERROR:" };
            state.notifier.notify(&format!("{} {}", prefix, e)).await;
            WebhookResponse::fault(e.to_string())
        }
    }
}

/// Translate dispatcher events into notifications and ledger rows
async fn publish_events(state: &AppState, events: &[TradeEvent]) {
    for event in events {
        state.notifier.notify(&render_event(event)).await;
        if let TradeEvent::TradeLogged(row) = event {
            state.ledger.append(row).await;
        }
    }
}
