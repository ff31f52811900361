//! Chat completions over a raw HTTP POST with a bearer token.

use super::{ChatCompleter, MAX_TOKENS, TEMPERATURE};
use crate::error::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// Timeout for the raw HTTP path.
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Plain-HTTP completer against `{api_base}/chat/completions`.
pub struct HttpCompleter {
    api_key: String,
    endpoint: String,
    model: String,
    client: OnceCell<Client>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl HttpCompleter {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        info!("OpenAI HTTP client deferred");
        Self {
            api_key: api_key.trim().to_string(),
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            model: model.to_string(),
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                if self.api_key.is_empty() {
                    return Err(RagError::Config("OPENAI_API_KEY is not set".to_string()));
                }
                let client = Client::builder()
                    .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                    .build()?;
                info!("Initialized OpenAI HTTP client");
                Ok::<_, RagError>(client)
            })
            .await
    }

    fn request_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| RagError::Llm("Empty response from LLM".to_string()))
}

#[async_trait]
impl ChatCompleter for HttpCompleter {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let client = self.client().await?;

        let response = client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system, user))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RagError::Llm(format!(
                "Chat completion failed ({}): {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        debug!("Received {} choice(s) via HTTP", parsed.choices.len());
        first_content(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_initialized(&self) -> bool {
        self.client.initialized()
    }
}
