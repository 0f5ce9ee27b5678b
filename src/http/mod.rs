//! HTTP transport with retry and rate limiting
//!
//! # Overview
//!
//! Every network call in the exporter goes through `HttpClient`, which
//! owns the transport tier of the retry policy: bounded retries with
//! backoff for timeouts, connection errors, and a configurable set of
//! server status codes. Anything that survives the budget here surfaces
//! as a classified error for the caller to handle.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
