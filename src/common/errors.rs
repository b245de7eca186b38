//! Error types for the application

use thiserror::Error;

/// Result type alias using our BotError
pub type Result<T> = std::result::Result<T, BotError>;

/// Main error type for signal processing and exchange operations
#[derive(Error, Debug)]
pub enum BotError {
    /// Malformed or incomplete inbound signal
    #[error("Invalid signal: {0}")]
    Validation(String),

    /// Instrument metadata could not be fetched from the venue
    #[error("Instrument rules unavailable for {symbol}: {reason}")]
    RulesUnavailable { symbol: String, reason: String },

    /// Stop loss coincides with the reference price
    #[error("Stop loss cannot equal the entry price")]
    InvalidStop,

    /// Quantized quantity fell below the venue minimum
    #[error("Quantity {qty} is below the minimum {min_qty} for {symbol}")]
    QtyBelowMinimum {
        symbol: String,
        qty: String,
        min_qty: String,
    },

    /// A second entry signal arrived for a key with an active trade
    #[error("Slot {key} already holds an active trade")]
    SlotOccupied { key: String },

    /// Exchange returned a non-zero status code
    #[error("Bybit error ({code}): {message}")]
    VenueRejection { code: i64, message: String },

    /// Position is live but stop/target attachment failed.
    /// Requires manual intervention; never retried automatically.
    #[error("CRITICAL: position {symbol} is open without stop/target: {reason}")]
    PartialFailure { symbol: String, reason: String },

    /// Durable trade-context store is unreachable.
    /// Must never be masked as "no active trade".
    #[error("Trade context store unavailable: {0}")]
    StoreUnavailable(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<redis::RedisError> for BotError {
    fn from(err: redis::RedisError) -> Self {
        BotError::StoreUnavailable(err.to_string())
    }
}

impl BotError {
    /// Rejected-trade errors are operator notices, not system faults.
    /// The webhook answers them with a 200 "rejected" status instead of a 500.
    pub fn is_trade_rejection(&self) -> bool {
        matches!(
            self,
            BotError::InvalidStop
                | BotError::QtyBelowMinimum { .. }
                | BotError::SlotOccupied { .. }
        )
    }

    /// Partial failures are reported at CRITICAL severity and need an operator.
    pub fn is_critical(&self) -> bool {
        matches!(self, BotError::PartialFailure { .. })
    }
}
