//! Inbound webhook server

pub mod webhook;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::executor::Dispatcher;
use crate::notify::{Notifier, TradeLedger};

/// Shared state behind the webhook handlers
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub notifier: Arc<dyn Notifier>,
    pub ledger: Arc<dyn TradeLedger>,
}

/// HTTP server exposing the signal webhook
pub struct WebhookServer {
    state: Arc<AppState>,
}

impl WebhookServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/webhook", post(webhook::handle_signal))
            .route("/health", get(webhook::health))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process is stopped.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind or serve.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("webhook server listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
