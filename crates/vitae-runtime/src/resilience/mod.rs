//! Resilience patterns for vitae-runtime.
//!
//! This module provides:
//! - Request throttle to serialize calls to a rate-limited API
//! - Retry with exponential backoff for rate-limited failures
//! - Provider fallback with provenance annotation

mod fallback;
mod retry;
mod throttle;

pub use fallback::{run_with_fallback, FallbackError, FallbackParser, Parsed, ProviderRole};
pub use retry::{RateLimitSignal, RetryPolicy};
pub use throttle::RequestThrottle;
