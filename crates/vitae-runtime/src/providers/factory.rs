//! Provider factory pattern for dynamic parse-provider registration.
//!
//! Providers register factories that create instances from configuration,
//! so a deployment can switch its primary/secondary pair without touching
//! an enum.
//!
//! ## Usage
//!
//! ```ignore
//! let mut registry = ProviderRegistry::new();
//! registry.register(Arc::new(OpenAiProviderFactory));
//!
//! let provider = registry.create("openai", &config)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{ParseProvider, ProviderError};

/// Factory for creating parse providers from configuration.
///
/// Each factory is responsible for:
/// 1. Validating its configuration format
/// 2. Creating provider instances
/// 3. Providing a unique type identifier
pub trait ProviderFactory: Send + Sync {
    /// Unique identifier for this provider type.
    ///
    /// Examples: "openai", "bedrock", "local"
    fn provider_type(&self) -> &'static str;

    /// Create a provider instance from JSON configuration.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn ParseProvider>, ProviderError>;

    /// Validate configuration without creating a provider.
    ///
    /// Use this for fast config validation during startup.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    /// Get default configuration for this provider.
    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    /// Human-readable description of this provider.
    fn description(&self) -> &'static str {
        "Parse Provider"
    }
}

/// Registry of available provider factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory.
    ///
    /// If a factory with the same type already exists, it will be replaced.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    /// Create a provider from type name and configuration.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn ParseProvider>, ProviderError> {
        self.factories
            .get(provider_type)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "Unknown provider type: '{}'. Available: {:?}",
                    provider_type,
                    self.available_types()
                ))
            })?
            .create(config)
    }

    /// Validate configuration for a provider type.
    pub fn validate(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<(), ProviderError> {
        self.factories
            .get(provider_type)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!("Unknown provider type: '{provider_type}'"))
            })?
            .validate_config(config)
    }

    /// List available provider types.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a provider type is registered.
    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    /// Get default configuration for a provider type.
    pub fn default_config(&self, provider_type: &str) -> Option<JsonValue> {
        self.factories
            .get(provider_type)
            .map(|f| f.default_config())
    }

    /// Create a registry with all built-in providers registered.
    #[cfg(feature = "openai")]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::OpenAiProviderFactory));
        registry
    }

    /// Create a registry with all built-in providers registered.
    #[cfg(not(feature = "openai"))]
    pub fn with_defaults() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}
