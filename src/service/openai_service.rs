use std::time::Duration;

use async_trait::async_trait;

use crate::clients::openai_client::OpenAIHttpClient;
use crate::error::LlmError;

#[async_trait]
pub trait OpenAIClient: Send + Sync {
    /// Sends a fully rendered prompt and returns the model's raw text reply.
    async fn generate_prompt(&self, prompt: &str, prompt_type: &str) -> Result<String, LlmError>;
}

pub struct OpenAIService {
    client: OpenAIHttpClient,
}

impl OpenAIService {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: OpenAIHttpClient::new(api_key, base_url, model, timeout)?,
        })
    }
}

#[async_trait]
impl OpenAIClient for OpenAIService {
    async fn generate_prompt(&self, prompt: &str, prompt_type: &str) -> Result<String, LlmError> {
        self.client.query_openai(prompt.to_string(), prompt_type).await
    }
}
