use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{Map, Value};

use crate::error::AssistantError;
use crate::models::intent::{IntentDecision, NoteAction};
use crate::service::extractor::{BraceSpanExtractor, ResponseExtractor};
use crate::service::openai_service::OpenAIClient;
use crate::service::prompts::PromptScope;
use crate::service::schedule::{CalendarSlots, resolve_schedule};

#[async_trait]
pub trait IntentRouter: Send + Sync {
    async fn route(
        &self,
        text: &str,
        scope: PromptScope,
        now: DateTime<Tz>,
    ) -> Result<IntentDecision, AssistantError>;
}

/// Classifies with one model round trip per message.
pub struct OpenAIRouter {
    openai: Arc<dyn OpenAIClient>,
    extractor: Box<dyn ResponseExtractor>,
}

impl OpenAIRouter {
    pub fn new(openai: Arc<dyn OpenAIClient>) -> Self {
        Self::with_extractor(openai, Box::new(BraceSpanExtractor))
    }

    pub fn with_extractor(openai: Arc<dyn OpenAIClient>, extractor: Box<dyn ResponseExtractor>) -> Self {
        Self { openai, extractor }
    }
}

#[async_trait]
impl IntentRouter for OpenAIRouter {
    async fn route(
        &self,
        text: &str,
        scope: PromptScope,
        now: DateTime<Tz>,
    ) -> Result<IntentDecision, AssistantError> {
        let prompt = scope.render(text, &now);
        let payload = self.openai.generate_prompt(&prompt, scope.prompt_type()).await?;
        log::debug!("model reply for {} prompt: {}", scope.prompt_type(), payload);

        let object = self.extractor.extract(&payload)?;
        parse_decision(&object, scope, text, &now)
    }
}

/// Validates an extracted object against the schema of `scope`.
pub fn parse_decision(
    object: &Map<String, Value>,
    scope: PromptScope,
    text: &str,
    now: &DateTime<Tz>,
) -> Result<IntentDecision, AssistantError> {
    match scope {
        PromptScope::Assistant => {
            let action = object.get("action").and_then(Value::as_str).map(str::trim);
            match action {
                Some("note") => note_decision(object, "note_action"),
                Some("calendar") => Ok(calendar_decision(object, text, now)),
                Some(other) => Err(AssistantError::Classification(format!(
                    "unknown action {:?}",
                    other
                ))),
                None => Err(AssistantError::Classification("missing action".to_string())),
            }
        }
        PromptScope::Note => note_decision(object, "action"),
        PromptScope::Event => Ok(calendar_decision(object, text, now)),
    }
}

fn note_decision(object: &Map<String, Value>, action_key: &str) -> Result<IntentDecision, AssistantError> {
    let raw_action = object
        .get(action_key)
        .and_then(Value::as_str)
        .ok_or_else(|| AssistantError::Classification(format!("missing {}", action_key)))?;
    let action = NoteAction::parse(raw_action).ok_or_else(|| {
        AssistantError::Classification(format!("unknown note action {:?}", raw_action))
    })?;
    let topic = object
        .get("topic")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AssistantError::Classification("missing topic".to_string()))?;

    Ok(IntentDecision::Note {
        action,
        topic: topic.to_string(),
    })
}

fn calendar_decision(object: &Map<String, Value>, text: &str, now: &DateTime<Tz>) -> IntentDecision {
    let schedule = resolve_schedule(&CalendarSlots::from_object(object), text, now);
    IntentDecision::Calendar {
        title: schedule.title,
        start: schedule.start,
        end: schedule.end,
    }
}
