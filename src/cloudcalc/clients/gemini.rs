//! `GeminiClient` implements `ClientWrapper` over Gemini's OpenAI-compatible
//! chat endpoint. It is the default provider for AI mode.
//!
//! ```rust,no_run
//! use cloudcalc::clients::gemini::{GeminiClient, Model};
//! use cloudcalc::client_wrapper::{ClientWrapper, Message, Role};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let secret_key = std::env::var("GEMINI_API_KEY")?;
//!     let client = GeminiClient::new_with_model_enum(&secret_key, Model::Gemini25Flash);
//!
//!     let resp = client.send_message(&[
//!         Message { role: Role::User, content: "Quanto é 15% de 200?".into() },
//!     ]).await?;
//!     println!("{}: {}", client.model_name(), resp.content);
//!     Ok(())
//! }
//! ```
use crate::cloudcalc::client_wrapper::{ClientWrapper, Message, Role, TokenUsage};
use crate::cloudcalc::clients::common::{send_and_track, to_chat_messages};
use async_trait::async_trait;
use log::error;
use openai_rust2 as openai_rust;
use std::error::Error;
use std::sync::Mutex;

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

pub struct GeminiClient {
    client: openai_rust::Client,
    pub model: String,
    token_usage: Mutex<Option<TokenUsage>>,
}

/// Models that answer short math prompts well.
///
/// ```rust
/// use cloudcalc::clients::gemini::{model_to_string, Model};
///
/// assert_eq!(model_to_string(Model::Gemini25Flash), "gemini-2.5-flash");
/// assert_eq!(model_to_string(Model::Gemini20FlashLite001), "gemini-2.0-flash-lite-001");
/// ```
pub enum Model {
    Gemini20Flash,
    Gemini20FlashLite001,
    Gemini25Flash,
    Gemini25Pro,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Gemini20Flash => "gemini-2.0-flash".to_string(),
        Model::Gemini20FlashLite001 => "gemini-2.0-flash-lite-001".to_string(),
        Model::Gemini25Flash => "gemini-2.5-flash".to_string(),
        Model::Gemini25Pro => "gemini-2.5-pro".to_string(),
    }
}

impl GeminiClient {
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, DEFAULT_BASE_URL)
    }

    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    /// This function is used to create a GeminiClient with a custom base URL
    /// The default base URL is "<https://generativelanguage.googleapis.com/v1beta/>"
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        GeminiClient {
            client: openai_rust::Client::new_with_base_url(secret_key, base_url),
            model: model_name.to_string(),
            token_usage: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ClientWrapper for GeminiClient {
    async fn send_message(&self, messages: &[Message]) -> Result<Message, Box<dyn Error>> {
        let url_path = Some("/v1beta/chat/completions".to_string());
        let result = send_and_track(
            &self.client,
            &self.model,
            to_chat_messages(messages),
            url_path,
            &self.token_usage,
        )
        .await;

        match result {
            Ok(content) => Ok(Message {
                role: Role::Assistant,
                content,
            }),
            Err(err) => {
                if log::log_enabled!(log::Level::Error) {
                    error!("GeminiClient::send_message error: {}", err);
                }
                Err(err)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    /// Gives access to the usage recorded by the last request; the default trait
    /// implementation of `usage_slot()` returns `None`.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
