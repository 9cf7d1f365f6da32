//! OpenAI-compatible chat-completions parse provider.
//!
//! Sends the raw resume text with an extraction system prompt and expects
//! the model to answer with a single JSON object matching [`ParsedResume`].
//! Works against any endpoint speaking the chat-completions dialect via
//! `base_url` override.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

use vitae_core::ParsedResume;

use super::{factory::ProviderFactory, ParseConfig, ParseProvider, ProviderError};

/// Environment variable name for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a resume parser. Extract the resume \
into a single JSON object with these keys: name, email, phone, location, summary \
(strings or null), skills (array of strings), experience (array of {company, title, \
start_date, end_date, highlights}), education (array of {institution, degree, field, \
year}). Respond with JSON only, no prose.";

/// OpenAI-compatible parse provider.
///
/// The API key is held in a [`SecretString`] so it cannot leak through
/// `Debug` output; it is exposed only at the request site.
pub struct OpenAiProvider {
    api_key: SecretString,
    base_url: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a new provider with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let key = std::env::var(OPENAI_API_KEY_ENV).map_err(|_| {
            ProviderError::NotConfigured(format!("{OPENAI_API_KEY_ENV} not set"))
        })?;
        Ok(Self::new(key))
    }

    /// Create from JSON configuration with environment fallback.
    ///
    /// Checks `api_key` in the config first, then `OPENAI_API_KEY`.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let provider = match config["api_key"].as_str() {
            Some(key) => Self::new(key),
            None => Self::from_env()?,
        };

        let base_url = config["base_url"]
            .as_str()
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string();

        Ok(Self {
            base_url,
            ..provider
        })
    }

    /// Set custom base URL (proxies, compatible endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn get_client(&self) -> &reqwest::Client {
        static CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client")
        })
    }
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatRequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    type_: String,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Strip ```json ... ``` fences some models wrap around JSON output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let stripped = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    stripped
        .trim_start()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or_else(|| stripped.trim())
}

#[async_trait]
impl ParseProvider for OpenAiProvider {
    async fn parse(
        &self,
        text: &str,
        config: &ParseConfig,
    ) -> Result<ParsedResume, ProviderError> {
        let client = self.get_client();

        let request = ChatRequest {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            messages: vec![
                ChatRequestMessage {
                    role: "system".to_string(),
                    content: EXTRACTION_SYSTEM_PROMPT.to_string(),
                },
                ChatRequestMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: (config.temperature != 0.0).then_some(config.temperature),
            response_format: ResponseFormat {
                type_: "json_object".to_string(),
            },
        };

        let response = client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if !status.is_success() {
            let error_body = response
                .json::<ApiErrorBody>()
                .await
                .map_err(|e| ProviderError::ParseError(e.to_string()))?;

            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_body.error.message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::ParseError("empty completion".to_string()))?;

        let mut resume: ParsedResume = serde_json::from_str(strip_json_fences(&content))
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        resume.normalize();

        tracing::debug!(provider = self.name(), "resume extraction succeeded");

        Ok(resume)
    }

    async fn health_check(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Factory for creating OpenAI providers from configuration.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "sk-...",          // Optional, falls back to OPENAI_API_KEY env
///   "base_url": "https://...",    // Optional, compatible endpoint
///   "model": "gpt-4o-mini"        // Optional, default model
/// }
/// ```
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "openai"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn ParseProvider>, ProviderError> {
        let provider = OpenAiProvider::from_config(config)?;
        Ok(Arc::new(provider))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if config["api_key"].as_str().is_none() && std::env::var(OPENAI_API_KEY_ENV).is_err() {
            return Err(ProviderError::NotConfigured(format!(
                "OpenAI API key required: set 'api_key' in config or {} env",
                OPENAI_API_KEY_ENV
            )));
        }

        if let Some(url) = config["base_url"].as_str() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProviderError::NotConfigured(
                    "base_url must start with http:// or https://".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({
            "model": "gpt-4o-mini"
        })
    }

    fn description(&self) -> &'static str {
        "OpenAI-compatible chat-completions resume parser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiProvider::new("test-key");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret_key = "sk-super-secret-key-12345";
        let provider = OpenAiProvider::new(secret_key);

        let debug_output = format!("{:?}", provider);
        assert!(
            !debug_output.contains(secret_key),
            "API key was exposed in Debug output!"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_health_check_requires_nonempty_key() {
        assert!(OpenAiProvider::new("sk-test").health_check().await);
        assert!(!OpenAiProvider::new("").health_check().await);
    }

    #[test]
    fn test_from_config_with_base_url() {
        let config = serde_json::json!({
            "api_key": "config-key",
            "base_url": "https://llm.internal/v1"
        });
        let provider = OpenAiProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, "https://llm.internal/v1");
    }

    #[test]
    fn test_factory_validate_invalid_base_url() {
        let factory = OpenAiProviderFactory;
        let config = serde_json::json!({
            "api_key": "test-key",
            "base_url": "invalid-url"
        });
        assert!(factory.validate_config(&config).is_err());
    }

    #[test]
    fn test_factory_default_config() {
        let factory = OpenAiProviderFactory;
        assert_eq!(factory.default_config()["model"], "gpt-4o-mini");
    }

    #[test]
    fn test_strip_json_fences() {
        assert_eq!(
            strip_json_fences("```json\n{\"name\": null}\n```"),
            "{\"name\": null}"
        );
        assert_eq!(
            strip_json_fences("```\n{\"name\": null}\n```"),
            "{\"name\": null}"
        );
        assert_eq!(strip_json_fences("{\"name\": null}"), "{\"name\": null}");
    }
}
