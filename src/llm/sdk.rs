//! Chat completions through the async-openai SDK.

use super::{ChatCompleter, MAX_TOKENS, TEMPERATURE};
use crate::error::{RagError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// SDK-backed completer. The client is built on first use.
pub struct SdkCompleter {
    api_key: String,
    api_base: String,
    model: String,
    client: OnceCell<Client<OpenAIConfig>>,
}

impl SdkCompleter {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        info!("OpenAI client deferred");
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.to_string(),
            model: model.to_string(),
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client<OpenAIConfig>> {
        self.client
            .get_or_try_init(|| async {
                let client = create_client(&self.api_key, &self.api_base)?;
                info!("Initialized OpenAI client");
                Ok::<_, RagError>(client)
            })
            .await
    }
}

#[async_trait]
impl ChatCompleter for SdkCompleter {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    #[allow(deprecated)]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let client = self.client().await?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .map_err(|e| RagError::Llm(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user.to_string())
                .build()
                .map_err(|e| RagError::Llm(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(MAX_TOKENS)
            .temperature(TEMPERATURE)
            .build()
            .map_err(|e| RagError::Llm(e.to_string()))?;

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| RagError::Llm(format!("Failed to generate response: {}", e)))?;

        debug!("Received {} choice(s)", response.choices.len());

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RagError::Llm("Empty response from LLM".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_initialized(&self) -> bool {
        self.client.initialized()
    }
}
