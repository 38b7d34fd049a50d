use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Oracle, OracleError};

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat-completions oracle.
pub struct OpenAiOracle {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    /// Build an oracle with the default model and a 60s request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, OracleError> {
        Self::with_model(api_key, DEFAULT_MODEL, Duration::from_secs(60))
    }

    pub fn with_model(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

impl Oracle for OpenAiOracle {
    fn ask<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, OracleError>> + Send + 'a>> {
        Box::pin(async move {
            let body = ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            };

            let resp = self
                .client
                .post(COMPLETIONS_URL)
                .bearer_auth(self.api_key.trim())
                .json(&body)
                .send()
                .await?;

            if !resp.status().is_success() {
                return Err(OracleError::Status(resp.status()));
            }

            let parsed: ChatResponse = resp.json().await?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .ok_or_else(|| OracleError::Malformed("response contained no choices".into()))?;

            Ok(content.trim().to_string())
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}
