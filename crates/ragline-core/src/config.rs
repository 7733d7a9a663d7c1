//! Provider and store configuration.
//!
//! The environment is read once at startup into an explicit [`Settings`]
//! value that gets passed into constructors. Selection is deterministic
//! for a given snapshot: `GOOGLE_API_KEY` wins over `OPENAI_API_KEY` when
//! both are present, and a variable set to the empty string is a
//! configuration error rather than a silent skip.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hosted LLM / embedding provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    OpenAi,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Google => write!(f, "google"),
            Provider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Which provider is active, plus its credential.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub api_key: String,
}

impl ProviderConfig {
    /// Resolve the provider from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_keys(
            std::env::var("GOOGLE_API_KEY").ok(),
            std::env::var("OPENAI_API_KEY").ok(),
        )
    }

    /// Resolve the provider from an environment snapshot.
    ///
    /// Google is checked first; a key that is present but empty fails
    /// rather than falling through to the other provider.
    pub fn from_keys(google: Option<String>, openai: Option<String>) -> Result<Self> {
        if let Some(key) = google {
            if key.is_empty() {
                return Err(Error::Config("GOOGLE_API_KEY is set but empty".into()));
            }
            return Ok(Self {
                provider: Provider::Google,
                api_key: key,
            });
        }
        if let Some(key) = openai {
            if key.is_empty() {
                return Err(Error::Config("OPENAI_API_KEY is set but empty".into()));
            }
            return Ok(Self {
                provider: Provider::OpenAi,
                api_key: key,
            });
        }
        Err(Error::Config(
            "No LLM API key found. Set GOOGLE_API_KEY or OPENAI_API_KEY.".into(),
        ))
    }
}

/// Vector store (Supabase) connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: String,
}

impl StoreConfig {
    /// Read the store connection from the environment, if configured.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty())?;
        let service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self { url, service_key })
    }
}

/// Top-level server settings, assembled once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: ProviderConfig,
    pub store: Option<StoreConfig>,
    pub demo_mode: bool,
    pub port: u16,
    pub tavily_api_key: Option<String>,
}

impl Settings {
    /// Assemble settings from the process environment.
    ///
    /// Missing LLM credentials are fatal here; the store and search-tool
    /// credentials are optional and checked by the routes that need them.
    pub fn from_env() -> Result<Self> {
        let provider = ProviderConfig::from_env()?;
        let store = StoreConfig::from_env();
        let demo_mode = std::env::var("DEMO_MODE")
            .map(|v| v == "true")
            .unwrap_or(false);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let tavily_api_key = std::env::var("TAVILY_API_KEY")
            .ok()
            .filter(|v| !v.is_empty());

        Ok(Self {
            provider,
            store,
            demo_mode,
            port,
            tavily_api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_key_selects_google() {
        let config = ProviderConfig::from_keys(Some("g-key".into()), None).unwrap();
        assert_eq!(config.provider, Provider::Google);
        assert_eq!(config.api_key, "g-key");
    }

    #[test]
    fn test_openai_key_selects_openai() {
        let config = ProviderConfig::from_keys(None, Some("sk-test".into())).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.api_key, "sk-test");
    }

    #[test]
    fn test_google_wins_when_both_present() {
        let config =
            ProviderConfig::from_keys(Some("g-key".into()), Some("sk-test".into())).unwrap();
        assert_eq!(config.provider, Provider::Google);
    }

    #[test]
    fn test_no_keys_is_config_error() {
        let err = ProviderConfig::from_keys(None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_empty_key_is_config_error_not_fallthrough() {
        // An empty Google key must not fall through to OpenAI.
        let err =
            ProviderConfig::from_keys(Some(String::new()), Some("sk-test".into())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));

        let err = ProviderConfig::from_keys(None, Some(String::new())).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_selection_is_deterministic() {
        for _ in 0..3 {
            let config =
                ProviderConfig::from_keys(Some("g".into()), Some("o".into())).unwrap();
            assert_eq!(config.provider, Provider::Google);
        }
    }
}
