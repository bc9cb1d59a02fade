//! Configuration for CloudCalc.
//!
//! Provides the [`CloudCalcConfig`] struct that selects and authenticates the
//! LLM provider behind AI mode. Construct it by hand, or let
//! [`CloudCalcConfig::from_env`] read the usual environment variables. No
//! config-file parsing dependencies are involved.
//!
//! # Example
//!
//! ```rust
//! use cloudcalc::{CloudCalcConfig, Provider};
//!
//! // Gemini with the provider's default model, no key yet
//! let config = CloudCalcConfig::default();
//! assert_eq!(config.provider, Provider::Gemini);
//!
//! // Or spell everything out
//! let config = CloudCalcConfig {
//!     provider: Provider::OpenAI,
//!     api_key: Some("sk-...".to_string()),
//!     model: Some("gpt-4.1-mini".to_string()),
//!     base_url: None,
//! };
//! assert_eq!(config.model_or_default(), "gpt-4.1-mini");
//! ```

use std::fmt;
use std::str::FromStr;

/// Environment variable names read by [`CloudCalcConfig::from_env`].
pub const ENV_PROVIDER: &str = "CLOUDCALC_PROVIDER";
pub const ENV_API_KEY: &str = "CLOUDCALC_API_KEY";
pub const ENV_LEGACY_API_KEY: &str = "API_KEY";
pub const ENV_MODEL: &str = "CLOUDCALC_MODEL";
pub const ENV_BASE_URL: &str = "CLOUDCALC_BASE_URL";

/// LLM vendor answering AI-mode requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    OpenAI,
}

impl Provider {
    /// Model used when the config does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::OpenAI => "gpt-4.1-mini",
        }
    }

    /// Provider-specific API key variable, checked after the generic ones.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Error returned when a provider name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown provider '{}' (expected 'gemini' or 'openai')", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Settings for the AI resolver.
///
/// A missing or blank `api_key` is not an error here: AI mode simply fails
/// every request (see [`build_resolver`](crate::resolver::build_resolver)).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudCalcConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Model identifier; `None` uses [`Provider::default_model`].
    pub model: Option<String>,
    /// Custom OpenAI-compatible endpoint; `None` uses the provider's own.
    pub base_url: Option<String>,
}

impl CloudCalcConfig {
    /// Read the configuration from the process environment.
    ///
    /// - `CLOUDCALC_PROVIDER`: `gemini` (default) or `openai`
    /// - `CLOUDCALC_API_KEY`, then `API_KEY`, then `GEMINI_API_KEY` / `OPENAI_API_KEY`
    /// - `CLOUDCALC_MODEL`, `CLOUDCALC_BASE_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same resolution as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let provider = match non_blank(ENV_PROVIDER) {
            Some(name) => name.parse::<Provider>().unwrap_or_else(|err| {
                log::warn!("{}; falling back to {}", err, Provider::default());
                Provider::default()
            }),
            None => Provider::default(),
        };

        let api_key = non_blank(ENV_API_KEY)
            .or_else(|| non_blank(ENV_LEGACY_API_KEY))
            .or_else(|| non_blank(provider.api_key_var()));

        CloudCalcConfig {
            provider,
            api_key,
            model: non_blank(ENV_MODEL),
            base_url: non_blank(ENV_BASE_URL),
        }
    }

    /// True when a non-blank API key is present.
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn model_or_default(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}
