//! Parse provider abstractions for vitae-runtime.
//!
//! A parse provider turns raw resume text into a [`ParsedResume`]. This
//! module defines the trait, the shared request configuration, and the
//! provider error taxonomy the resilience layer keys on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use vitae_core::ParsedResume;

use crate::resilience::RateLimitSignal;

mod factory;

#[cfg(feature = "openai")]
mod openai;

pub use factory::{ProviderFactory, ProviderRegistry};

#[cfg(feature = "openai")]
pub use openai::{OpenAiProvider, OpenAiProviderFactory};

/// Errors from parse providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl RateLimitSignal for ProviderError {
    /// Only `RateLimited` is transient; every other kind fails fast.
    fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

/// Configuration for a parse request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature (0.0 for deterministic extraction)
    pub temperature: f32,

    /// Request timeout
    #[serde(with = "crate::config::duration_millis")]
    pub timeout: Duration,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 2048,
            temperature: 0.0,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Provider abstraction allows swapping parse backends.
///
/// Implementations must map their transport's rate-limit signal to
/// [`ProviderError::RateLimited`]; the retry layer recognizes nothing else
/// as transient.
#[async_trait]
pub trait ParseProvider: Send + Sync {
    /// Parse raw resume text into a structured resume.
    async fn parse(
        &self,
        text: &str,
        config: &ParseConfig,
    ) -> Result<ParsedResume, ProviderError>;

    /// Check if provider is healthy.
    async fn health_check(&self) -> bool;

    /// Get provider name for logs and provenance.
    fn name(&self) -> &str;

    /// Estimate tokens for a document.
    fn estimate_tokens(&self, text: &str) -> u32 {
        // Simple estimate: ~4 chars per token
        (text.len() / 4) as u32
    }
}
