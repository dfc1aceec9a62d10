use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIHttpClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAIHttpClient {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    pub async fn query_openai(&self, prompt: String, prompt_type: &str) -> Result<String, LlmError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: system_message(prompt_type).to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: 1500,
            temperature: 0.2,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::warn!("model request failed with status {}: {}", status, text);
            return Err(LlmError::Status(status.as_u16()));
        }

        let parsed: OpenAIResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::Response(format!("failed to parse body: {}", e)))?;

        match parsed.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => {
                log::warn!("no choices in model response: {}", text);
                Err(LlmError::Response("no choices returned".to_string()))
            }
        }
    }
}

fn system_message(prompt_type: &str) -> &'static str {
    match prompt_type {
        "assistant" | "note" => {
            "You are a strict JSON intent classifier. Reply ONLY with a single JSON object, with no markdown, no backticks, and no extra text."
        }
        "event" => {
            "You are a strict JSON calendar event extraction engine. Reply ONLY with a single JSON object, with no markdown, no backticks, and no extra text."
        }
        _ => "You are a helpful assistant.",
    }
}
