//! # AI Resolver
//!
//! AI mode hands free-form text ("quanto é 15% de 200?", "sqrt(144) + 15%")
//! to an external reasoning service and expects back a display-ready result
//! plus a one-sentence explanation.
//!
//! The session only depends on the [`AiResolver`] trait. Every kind of
//! failure (transport error, empty or malformed reply, missing field, missing
//! credentials) is collapsed into one [`AiResolutionFailed`], so the session
//! never branches on why a request failed.
//!
//! [`LlmResolver`] implements the trait over any
//! [`ClientWrapper`](crate::client_wrapper::ClientWrapper), and
//! [`build_resolver`] picks the right client from a
//! [`CloudCalcConfig`](crate::CloudCalcConfig).
//!
//! ```rust
//! use cloudcalc::resolver::parse_solution;
//!
//! let solution = parse_solution(r#"{"result": 30, "explanation": "15% of 200 is 30."}"#).unwrap();
//! assert_eq!(solution.result, "30");
//!
//! assert!(parse_solution("I think the answer is 30").is_err());
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::cloudcalc::client_wrapper::{ClientWrapper, Message, Role};
use crate::cloudcalc::clients::gemini::GeminiClient;
use crate::cloudcalc::clients::openai::OpenAIClient;
use crate::cloudcalc::config::{CloudCalcConfig, Provider};

const SYSTEM_PROMPT: &str = "You are a specialized mathematical calculation assistant. \
Reply with a single raw JSON object and nothing else.";

/// A successful answer from the resolver. Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSolution {
    /// Display string; never re-parsed as a number.
    pub result: String,
    pub explanation: String,
}

/// Uniform failure of an AI request.
///
/// The reason is kept for logs and events only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResolutionFailed {
    reason: String,
}

impl AiResolutionFailed {
    pub fn new(reason: impl Into<String>) -> Self {
        AiResolutionFailed {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for AiResolutionFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AI resolution failed: {}", self.reason)
    }
}

impl Error for AiResolutionFailed {}

/// External collaborator that resolves AI-mode input.
#[async_trait]
pub trait AiResolver: Send + Sync {
    /// Resolve non-empty `input` into a result and explanation.
    async fn resolve(&self, input: &str) -> Result<AiSolution, AiResolutionFailed>;
}

/// Resolver used when no credentials are configured. Fails immediately.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredResolver;

#[async_trait]
impl AiResolver for UnconfiguredResolver {
    async fn resolve(&self, _input: &str) -> Result<AiSolution, AiResolutionFailed> {
        Err(AiResolutionFailed::new("API key missing"))
    }
}

/// Resolver that prompts an LLM through a [`ClientWrapper`] and parses its
/// JSON reply.
pub struct LlmResolver {
    client: Arc<dyn ClientWrapper>,
}

impl LlmResolver {
    pub fn new(client: Arc<dyn ClientWrapper>) -> Self {
        LlmResolver { client }
    }
}

#[async_trait]
impl AiResolver for LlmResolver {
    async fn resolve(&self, input: &str) -> Result<AiSolution, AiResolutionFailed> {
        let messages = [
            Message {
                role: Role::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: Role::User,
                content: build_prompt(input),
            },
        ];

        log::info!(
            "LlmResolver: asking {} to resolve {} chars",
            self.client.model_name(),
            input.len()
        );

        let reply = match self.client.send_message(&messages).await {
            Ok(reply) => reply,
            Err(err) => {
                log::error!("LlmResolver::resolve error: {}", err);
                return Err(AiResolutionFailed::new(err.to_string()));
            }
        };

        if let Some(usage) = self.client.get_last_usage() {
            log::debug!(
                "LlmResolver: tokens in={} out={} total={}",
                usage.input_tokens,
                usage.output_tokens,
                usage.total_tokens
            );
        }

        parse_solution(&reply.content)
    }
}

/// Build the user prompt for `input`.
pub fn build_prompt(input: &str) -> String {
    format!(
        r#"User Input: "{}"

Your tasks:
1. Solve the math problem provided in the input. It might be a simple expression or a word problem (e.g., "15% of 200").
2. Provide the numeric result clearly.
3. Provide a very brief, one-sentence explanation or the step taken.

Output Format (JSON):
{{
  "result": "the numeric answer",
  "explanation": "short explanation"
}}

Do not include markdown code blocks. Just the raw JSON string."#,
        input
    )
}

#[derive(Deserialize)]
struct RawSolution {
    result: Option<Value>,
    explanation: Option<String>,
}

/// Parse a model reply into an [`AiSolution`].
///
/// Accepts an optional surrounding markdown code fence. `result` may be a JSON
/// string or number; `explanation` must be a string. Both must be non-empty.
pub fn parse_solution(reply: &str) -> Result<AiSolution, AiResolutionFailed> {
    let body = strip_code_fence(reply);
    if body.is_empty() {
        return Err(AiResolutionFailed::new("empty reply"));
    }

    let raw: RawSolution = serde_json::from_str(body)
        .map_err(|err| AiResolutionFailed::new(format!("malformed reply: {}", err)))?;

    let result = match raw.result {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => {
            return Err(AiResolutionFailed::new(format!(
                "unexpected result type: {}",
                other
            )))
        }
        None => String::new(),
    };
    if result.is_empty() {
        return Err(AiResolutionFailed::new("reply has no result"));
    }

    let explanation = raw
        .explanation
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    if explanation.is_empty() {
        return Err(AiResolutionFailed::new("reply has no explanation"));
    }

    Ok(AiSolution {
        result,
        explanation,
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Build the resolver described by `config`.
///
/// Without credentials this returns an [`UnconfiguredResolver`], so AI mode
/// degrades to a displayed error rather than a crash.
pub fn build_resolver(config: &CloudCalcConfig) -> Arc<dyn AiResolver> {
    let api_key = match config.api_key.as_deref() {
        Some(key) if config.has_credentials() => key,
        _ => {
            log::warn!(
                "No API key configured for {}; AI mode will be unavailable.",
                config.provider
            );
            return Arc::new(UnconfiguredResolver);
        }
    };

    let model = config.model_or_default();
    let client: Arc<dyn ClientWrapper> = match (config.provider, config.base_url.as_deref()) {
        (Provider::Gemini, Some(base_url)) => {
            Arc::new(GeminiClient::new_with_base_url(api_key, model, base_url))
        }
        (Provider::Gemini, None) => Arc::new(GeminiClient::new_with_model_string(api_key, model)),
        (Provider::OpenAI, Some(base_url)) => {
            Arc::new(OpenAIClient::new_with_base_url(api_key, model, base_url))
        }
        (Provider::OpenAI, None) => Arc::new(OpenAIClient::new_with_model_string(api_key, model)),
    };

    log::info!("AI mode using {} model {}", config.provider, model);
    Arc::new(LlmResolver::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }

    #[test]
    fn test_prompt_embeds_input() {
        let prompt = build_prompt("15% of 200");
        assert!(prompt.contains("User Input: \"15% of 200\""));
        assert!(prompt.contains("\"explanation\""));
    }
}
