// AI configuration and secrets management
//
// API keys are looked up in:
// 1. System keychain (when built with the `keychain` feature)
// 2. Environment variable (CONSOLIDATOR_GEMINI_KEY)
//
// Keys are NEVER stored in settings.json

use std::env;

use crate::settings::{AIProvider, AISettings};

/// Service name for keychain storage
#[cfg(feature = "keychain")]
const KEYCHAIN_SERVICE: &str = "consolidator";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key retrieved from system keychain
    Keychain,
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

impl KeyLookup {
    pub fn missing() -> Self {
        Self { key: None, source: KeySource::None }
    }
}

/// Get the environment variable name for a provider
pub fn env_var_name(provider: &str) -> String {
    format!("CONSOLIDATOR_{}_KEY", provider.to_uppercase())
}

/// Get the keychain account name for a provider
#[cfg_attr(not(feature = "keychain"), allow(dead_code))]
fn keychain_account(provider: &str) -> String {
    format!("ai/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (CONSOLIDATOR_GEMINI_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    // Try keychain first
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    // Fall back to environment variable
    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.trim().is_empty() {
            return KeyLookup {
                key: Some(key.trim().to_string()),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup::missing()
}

/// Store an API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key)
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(provider: &str, _key: &str) -> Result<(), String> {
    Err(format!(
        "Keychain support not enabled. Set {} environment variable instead.",
        env_var_name(provider)
    ))
}

/// Delete an API key from the system keychain
#[cfg(feature = "keychain")]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to access keychain entry: {}", e))?;

    entry
        .delete_credential()
        .map_err(|e| format!("Failed to delete key from keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_api_key(_provider: &str) -> Result<(), String> {
    Err("Keychain support not enabled.".to_string())
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved AI Configuration (single source of truth)
// ============================================================================

/// Status of the AI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIConfigStatus {
    /// AI is disabled (provider = none)
    Disabled,
    /// Provider selected and API key present
    Ready,
    /// Provider is configured but API key is missing
    MissingKey,
}

impl AIConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }
}

/// The effective AI configuration, fully resolved from settings and key lookup.
#[derive(Debug, Clone)]
pub struct ResolvedAIConfig {
    pub provider: AIProvider,
    /// Effective model (resolved from settings or provider default)
    pub model: String,
    /// Effective API base URL
    pub endpoint: String,
    /// Maximum number of values sent per request
    pub sample_limit: usize,
    /// API key (if available and provider needs one)
    pub api_key: Option<String>,
    /// Source of the API key
    pub key_source: KeySource,
    /// Overall status
    pub status: AIConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedAIConfig {
    /// Resolve the effective AI configuration from settings.
    pub fn from_settings(settings: &AISettings) -> Self {
        let lookup = if settings.provider.needs_api_key() {
            get_api_key(settings.provider.name())
        } else {
            KeyLookup::missing()
        };
        Self::from_settings_with_key(settings, lookup)
    }

    /// Resolve with an already-performed key lookup
    pub fn from_settings_with_key(settings: &AISettings, lookup: KeyLookup) -> Self {
        let provider = settings.provider;

        if !provider.is_enabled() {
            return Self {
                provider,
                model: String::new(),
                endpoint: String::new(),
                sample_limit: settings.sample_limit,
                api_key: None,
                key_source: KeySource::None,
                status: AIConfigStatus::Disabled,
                blocking_reason: Some("provider=none".to_string()),
            };
        }

        let (status, blocking_reason) = match lookup.key {
            Some(_) => (AIConfigStatus::Ready, None),
            None => (
                AIConfigStatus::MissingKey,
                Some(format!(
                    "No API key found. Set via keychain or {}",
                    env_var_name(provider.name())
                )),
            ),
        };

        Self {
            provider,
            model: settings.effective_model().to_string(),
            endpoint: settings.effective_endpoint().trim_end_matches('/').to_string(),
            sample_limit: settings.sample_limit,
            api_key: lookup.key,
            key_source: lookup.source,
            status,
            blocking_reason,
        }
    }

    /// Provider display name
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

// ============================================================================
// Diagnostics (for CLI doctor and debugging)
// ============================================================================

/// Diagnostic information about AI configuration
#[derive(Debug)]
pub struct AIDiagnostics {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub status: AIConfigStatus,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
    pub sample_limit: usize,
}

impl AIDiagnostics {
    pub fn from_resolved(config: &ResolvedAIConfig) -> Self {
        Self {
            provider: config.provider.name().to_string(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            status: config.status,
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
            sample_limit: config.sample_limit,
        }
    }
}

impl std::fmt::Display for AIDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AI Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        if !self.model.is_empty() {
            writeln!(f, "Model:             {}", self.model)?;
        }
        if !self.endpoint.is_empty() {
            writeln!(f, "Endpoint:          {}", self.endpoint)?;
        }
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        writeln!(f, "Sample limit:      {}", self.sample_limit)?;
        Ok(())
    }
}
