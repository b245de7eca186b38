//! Bybit module - V5 REST gateway implementation

pub mod auth;
pub mod client;
pub mod messages;

pub use client::BybitClient;
