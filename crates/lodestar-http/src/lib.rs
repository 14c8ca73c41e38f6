//! Outbound HTTP transport for Lodestar
//!
//! Wraps a configured `reqwest` client behind a mockable trait so the update
//! client can be exercised against scripted responses in tests.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpClientTrait`
//! - **Configurable**: Timeouts, proxy, user-agent, HTTPS-only mode
//! - **Status-preserving**: Non-success responses are returned, not raised,
//!   so callers can inspect rejection bodies
//! - **Testing support**: Easy mocking with wiremock

pub mod client;
pub mod config;
pub mod error;

pub use client::{shared_client, HttpClient, HttpClientTrait, JsonResponse};
pub use config::HttpConfig;
pub use error::{HttpError, Result};

/// Re-export commonly used types
pub use reqwest::StatusCode;
