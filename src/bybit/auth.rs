//! Authentication utilities for the Bybit V5 API

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{BotError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Generate the HMAC-SHA256 signature for a Bybit V5 request
///
/// The signed message is `timestamp + api_key + recv_window + payload`,
/// where `payload` is the query string for GET requests and the JSON body
/// for POST requests. The signature is hex encoded.
pub fn sign_request(
    secret: &str,
    api_key: &str,
    timestamp_ms: i64,
    recv_window_ms: u64,
    payload: &str,
) -> Result<String> {
    let message = format!("{}{}{}{}", timestamp_ms, api_key, recv_window_ms, payload);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::Configuration(format!("Failed to create HMAC: {}", e)))?;
    mac.update(message.as_bytes());
    let result = mac.finalize();

    Ok(hex::encode(result.into_bytes()))
}

/// Authentication headers for signed requests
#[derive(Debug, Clone)]
pub struct AuthHeaders {
    pub api_key: String,
    pub signature: String,
    pub timestamp_ms: i64,
    pub recv_window_ms: u64,
}

/// Generate authentication headers for a request payload
pub fn generate_auth_headers(
    api_key: &str,
    api_secret: &str,
    recv_window_ms: u64,
    payload: &str,
) -> Result<AuthHeaders> {
    let timestamp_ms = chrono::Utc::now().timestamp_millis();
    let signature = sign_request(api_secret, api_key, timestamp_ms, recv_window_ms, payload)?;

    Ok(AuthHeaders {
        api_key: api_key.to_string(),
        signature,
        timestamp_ms,
        recv_window_ms,
    })
}

impl AuthHeaders {
    /// Add authentication headers to a reqwest RequestBuilder
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-SIGN", &self.signature)
            .header("X-BAPI-SIGN-TYPE", "2")
            .header("X-BAPI-TIMESTAMP", self.timestamp_ms.to_string())
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
    }
}
