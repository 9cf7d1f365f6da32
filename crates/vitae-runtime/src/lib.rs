//! # vitae-runtime
//!
//! Provider-backed resume parsing with the resilience the providers
//! actually need: a request throttle for rate-limited APIs, retry with
//! exponential backoff, and a two-tier provider fallback that reports
//! which provider served each request.
//!
//! The three resilience pieces are independent; [`FallbackParser`] is the
//! composition used in practice (throttle the primary, retry while rate
//! limited, fall back to the secondary once).
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vitae_runtime::{FallbackParser, RequestThrottle, RetryPolicy};
//!
//! let parser = FallbackParser::new(bedrock, openai)
//!     .with_retry(RetryPolicy::default())
//!     .with_throttle(RequestThrottle::new(Duration::from_millis(2000)));
//!
//! let parsed = parser.parse(&resume_text).await?;
//! println!("served by {:?} (fallback: {})", parsed.provider, parsed.fallback);
//! ```

pub mod config;
pub mod providers;
pub mod resilience;

// Re-export main types at crate root
pub use config::{ConfigError, ProviderSelection, RetryConfig, RuntimeConfig, ThrottleConfig};
pub use providers::{ParseConfig, ParseProvider, ProviderError, ProviderFactory, ProviderRegistry};
pub use resilience::{
    run_with_fallback, FallbackError, FallbackParser, Parsed, ProviderRole, RateLimitSignal,
    RequestThrottle, RetryPolicy,
};

#[cfg(feature = "openai")]
pub use providers::{OpenAiProvider, OpenAiProviderFactory};
