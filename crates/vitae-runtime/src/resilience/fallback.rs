//! Provider fallback with provenance annotation.
//!
//! Prefers a primary parse provider (retried through [`RetryPolicy`] while
//! it is rate limited), substitutes the secondary provider on primary
//! failure, and reports which provider actually served the request. One
//! fallback tier only: when both providers fail, the combined error is
//! terminal.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitae_core::{contact, ParsedResume};

use crate::providers::{ParseConfig, ParseProvider, ProviderError};
use crate::resilience::{RequestThrottle, RetryPolicy};

/// Which provider produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Primary,
    Secondary,
}

/// A successful parse annotated with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parsed<T> {
    /// The parsed value itself
    pub value: T,

    /// Which provider served the request
    pub provider: ProviderRole,

    /// True when the secondary provider had to step in
    pub fallback: bool,

    /// The primary failure that forced the fallback, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,

    /// When the parse completed
    pub parsed_at: DateTime<Utc>,
}

impl<T> Parsed<T> {
    fn primary(value: T) -> Self {
        Self {
            value,
            provider: ProviderRole::Primary,
            fallback: false,
            fallback_reason: None,
            parsed_at: Utc::now(),
        }
    }

    fn secondary(value: T, reason: String) -> Self {
        Self {
            value,
            provider: ProviderRole::Secondary,
            fallback: true,
            fallback_reason: Some(reason),
            parsed_at: Utc::now(),
        }
    }
}

/// Terminal failure: both tiers exhausted.
#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("all providers failed; primary: {primary}; secondary: {secondary}")]
    AllProvidersFailed {
        primary: ProviderError,
        secondary: ProviderError,
    },
}

/// Run `primary` (with retries) and fall back to `secondary` on failure.
///
/// Per call the flow is: try primary, retrying while rate limited; on
/// primary failure of any kind, try secondary once; on secondary failure,
/// return the combined error.
pub async fn run_with_fallback<T, P, PFut, S, SFut>(
    retry: &RetryPolicy,
    primary: P,
    secondary: S,
) -> Result<Parsed<T>, FallbackError>
where
    P: FnMut() -> PFut,
    PFut: Future<Output = Result<T, ProviderError>>,
    S: FnOnce() -> SFut,
    SFut: Future<Output = Result<T, ProviderError>>,
{
    let primary_err = match retry.run(primary).await {
        Ok(value) => return Ok(Parsed::primary(value)),
        Err(err) => err,
    };

    tracing::warn!(error = %primary_err, "primary provider failed, falling back");

    match secondary().await {
        Ok(value) => Ok(Parsed::secondary(value, primary_err.to_string())),
        Err(secondary_err) => {
            tracing::error!(
                primary = %primary_err,
                secondary = %secondary_err,
                "both providers failed"
            );
            Err(FallbackError::AllProvidersFailed {
                primary: primary_err,
                secondary: secondary_err,
            })
        }
    }
}

/// Two-tier resume parser over a primary and secondary [`ParseProvider`].
///
/// All collaborators are injected: the retry policy, the parse config, and
/// optionally a shared [`RequestThrottle`] through which every primary
/// attempt is serialized (each retry attempt re-enters the queue, so
/// retried attempts also keep their distance from other callers).
pub struct FallbackParser {
    primary: Arc<dyn ParseProvider>,
    secondary: Arc<dyn ParseProvider>,
    retry: RetryPolicy,
    throttle: Option<RequestThrottle>,
    config: ParseConfig,
}

impl FallbackParser {
    /// Create a parser with default retry policy and parse config.
    pub fn new(primary: Arc<dyn ParseProvider>, secondary: Arc<dyn ParseProvider>) -> Self {
        Self {
            primary,
            secondary,
            retry: RetryPolicy::default(),
            throttle: None,
            config: ParseConfig::default(),
        }
    }

    /// Override the retry policy applied to the primary provider.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Serialize primary attempts through a shared throttle.
    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Override the parse configuration sent to both providers.
    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    /// Parse raw resume text, preferring the primary provider.
    ///
    /// Missing contact fields on the winning parse are backfilled
    /// deterministically from the raw text.
    pub async fn parse(&self, text: &str) -> Result<Parsed<ParsedResume>, FallbackError> {
        let text: Arc<str> = Arc::from(text);

        let primary_op = {
            let provider = Arc::clone(&self.primary);
            let throttle = self.throttle.clone();
            let config = self.config.clone();
            let text = Arc::clone(&text);
            move || {
                let provider = Arc::clone(&provider);
                let throttle = throttle.clone();
                let config = config.clone();
                let text = Arc::clone(&text);
                async move {
                    match throttle {
                        Some(throttle) => {
                            throttle
                                .submit(move || async move { provider.parse(&text, &config).await })
                                .await
                        }
                        None => provider.parse(&text, &config).await,
                    }
                }
            }
        };

        let secondary_op = {
            let provider = Arc::clone(&self.secondary);
            let config = self.config.clone();
            let text = Arc::clone(&text);
            move || async move { provider.parse(&text, &config).await }
        };

        let mut parsed = run_with_fallback(&self.retry, primary_op, secondary_op).await?;
        contact::backfill_contact(&mut parsed.value, &text);

        tracing::debug!(
            provider = ?parsed.provider,
            fallback = parsed.fallback,
            "resume parse completed"
        );

        Ok(parsed)
    }
}

impl std::fmt::Debug for FallbackParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackParser")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .field("retry", &self.retry)
            .field("throttled", &self.throttle.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Provider that replays a script of results, then repeats the last
    /// behavior as success.
    struct ScriptedProvider {
        name: &'static str,
        script: Mutex<VecDeque<Result<ParsedResume, ProviderError>>>,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(
            name: &'static str,
            script: Vec<Result<ParsedResume, ProviderError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ParseProvider for ScriptedProvider {
        async fn parse(
            &self,
            _text: &str,
            _config: &ParseConfig,
        ) -> Result<ParsedResume, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(ParsedResume::default()))
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn ok_resume(name: &str) -> Result<ParsedResume, ProviderError> {
        Ok(ParsedResume {
            name: Some(name.to_string()),
            ..Default::default()
        })
    }

    fn rate_limited() -> Result<ParsedResume, ProviderError> {
        Err(ProviderError::RateLimited { retry_after: None })
    }

    fn api_error(message: &str) -> Result<ParsedResume, ProviderError> {
        Err(ProviderError::ApiError {
            status: 400,
            message: message.to_string(),
        })
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_success_never_touches_secondary() {
        let primary = ScriptedProvider::new("p", vec![ok_resume("Ada")]);
        let secondary = ScriptedProvider::new("s", vec![]);

        let parser = FallbackParser::new(primary.clone(), secondary.clone())
            .with_retry(fast_retry());
        let parsed = parser.parse("Ada Lovelace").await.unwrap();

        assert_eq!(parsed.provider, ProviderRole::Primary);
        assert!(!parsed.fallback);
        assert_eq!(parsed.fallback_reason, None);
        assert_eq!(parsed.value.name.as_deref(), Some("Ada"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_secondary_serves_after_non_transient_primary_failure() {
        let primary = ScriptedProvider::new("p", vec![api_error("schema rejected")]);
        let secondary = ScriptedProvider::new("s", vec![ok_resume("Grace")]);

        let parser = FallbackParser::new(primary.clone(), secondary.clone())
            .with_retry(fast_retry());
        let parsed = parser.parse("Grace Hopper").await.unwrap();

        assert_eq!(parsed.provider, ProviderRole::Secondary);
        assert!(parsed.fallback);
        let reason = parsed.fallback_reason.unwrap();
        assert!(reason.contains("schema rejected"), "reason was: {reason}");
        // Non-transient errors are not retried.
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_failing_yields_combined_error() {
        let primary = ScriptedProvider::new("p", vec![api_error("primary exploded")]);
        let secondary = ScriptedProvider::new("s", vec![api_error("secondary exploded")]);

        let parser = FallbackParser::new(primary, secondary).with_retry(fast_retry());
        let err = parser.parse("text").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("primary exploded"), "message: {message}");
        assert!(message.contains("secondary exploded"), "message: {message}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_primary_recovers_within_retry_budget() {
        let primary = ScriptedProvider::new(
            "p",
            vec![rate_limited(), rate_limited(), ok_resume("Ada")],
        );
        let secondary = ScriptedProvider::new("s", vec![]);

        let parser = FallbackParser::new(primary.clone(), secondary.clone())
            .with_retry(fast_retry());
        let parsed = parser.parse("Ada Lovelace").await.unwrap();

        assert_eq!(parsed.provider, ProviderRole::Primary);
        assert!(!parsed.fallback);
        assert_eq!(primary.calls(), 3);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fall_back_to_secondary() {
        let primary = ScriptedProvider::new(
            "p",
            vec![rate_limited(), rate_limited(), rate_limited(), rate_limited()],
        );
        let secondary = ScriptedProvider::new("s", vec![ok_resume("Grace")]);

        let parser = FallbackParser::new(primary.clone(), secondary.clone())
            .with_retry(fast_retry());
        let parsed = parser.parse("text").await.unwrap();

        assert_eq!(parsed.provider, ProviderRole::Secondary);
        assert!(parsed.fallback);
        assert!(parsed
            .fallback_reason
            .as_deref()
            .unwrap()
            .contains("Rate limit"));
        // 1 initial try + 3 retries.
        assert_eq!(primary.calls(), 4);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_primary_attempts_keep_their_distance() {
        let primary = ScriptedProvider::new(
            "p",
            vec![rate_limited(), rate_limited(), ok_resume("Ada")],
        );
        let secondary = ScriptedProvider::new("s", vec![]);
        let throttle = RequestThrottle::new(Duration::from_millis(500));

        let start = tokio::time::Instant::now();
        let parser = FallbackParser::new(primary.clone(), secondary)
            .with_retry(fast_retry())
            .with_throttle(throttle);
        let parsed = parser.parse("text").await.unwrap();

        assert_eq!(parsed.provider, ProviderRole::Primary);
        assert_eq!(primary.calls(), 3);
        // Three throttled attempts: at least two 500 ms gaps elapsed.
        assert!(tokio::time::Instant::now() - start >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_contact_backfill_from_raw_text() {
        let primary = ScriptedProvider::new("p", vec![ok_resume("Ada")]);
        let secondary = ScriptedProvider::new("s", vec![]);

        let parser = FallbackParser::new(primary, secondary).with_retry(fast_retry());
        let parsed = parser
            .parse("Ada Lovelace\nada@example.com\nLondon")
            .await
            .unwrap();

        assert_eq!(parsed.value.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_provider_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProviderRole::Primary).unwrap(),
            "\"primary\""
        );
        assert_eq!(
            serde_json::to_string(&ProviderRole::Secondary).unwrap(),
            "\"secondary\""
        );
    }
}
