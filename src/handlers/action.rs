use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::AssistantResult;
use crate::models::calendar_event::CalendarEvent;
use crate::models::envelope::{AssistantReply, AssistantRequest};
use crate::models::intent::{IntentDecision, NoteAction};
use crate::models::note::NotePoints;
use crate::service::calendar_service::CalendarClient;
use crate::service::note_store::NoteStore;
use crate::service::prompts::PromptScope;
use crate::service::routing::IntentRouter;

pub const MISSING_MESSAGE: &str = "Please provide a message.";
pub const MISSING_POINTS: &str = "Please include points to add.";

/// Classifies a message and carries out the one action it asks for.
pub struct ActionEngine {
    router: Arc<dyn IntentRouter>,
    notes: Arc<dyn NoteStore>,
    calendar: Arc<dyn CalendarClient>,
    timezone: Tz,
}

impl ActionEngine {
    pub fn new(
        router: Arc<dyn IntentRouter>,
        notes: Arc<dyn NoteStore>,
        calendar: Arc<dyn CalendarClient>,
        timezone: Tz,
    ) -> Self {
        Self {
            router,
            notes,
            calendar,
            timezone,
        }
    }

    pub async fn handle_request(
        &self,
        request: AssistantRequest,
        scope: PromptScope,
        now: DateTime<Utc>,
    ) -> AssistantResult<AssistantReply> {
        let request_id = Uuid::new_v4();
        let Some(message) = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
        else {
            log::info!("request={} scope={} empty message", request_id, scope.prompt_type());
            return Ok(AssistantReply::text(MISSING_MESSAGE));
        };

        let decision = self
            .router
            .route(message, scope, now.with_timezone(&self.timezone))
            .await
            .inspect_err(|err| {
                log::warn!("request={} scope={} classification failed: {}", request_id, scope.prompt_type(), err)
            })?;
        log::info!("request={} scope={} intent={}", request_id, scope.prompt_type(), decision.label());

        let result = self.dispatch(decision, request.points).await;
        match &result {
            Ok(_) => log::info!("request={} completed", request_id),
            Err(err) => log::error!("request={} failed: {}", request_id, err),
        }
        result
    }

    pub async fn dispatch(
        &self,
        decision: IntentDecision,
        points: Option<NotePoints>,
    ) -> AssistantResult<AssistantReply> {
        match decision {
            IntentDecision::Note {
                action: NoteAction::Add,
                topic,
            } => {
                let Some(points) = points.and_then(NotePoints::into_points) else {
                    return Ok(AssistantReply::text(MISSING_POINTS));
                };
                let note = self.notes.upsert(&topic, &points).await?;
                Ok(AssistantReply::text(format!("Note added for topic '{}'.", note.topic)))
            }
            IntentDecision::Note {
                action: NoteAction::Retrieve,
                topic,
            } => match self.notes.get(&topic).await? {
                Some(points) => Ok(
                    AssistantReply::text(format!("Here are your notes for '{}':", topic))
                        .with_points(points),
                ),
                None => Ok(AssistantReply::text(format!(
                    "No note found for topic '{}'.",
                    topic
                ))),
            },
            IntentDecision::Calendar { title, start, end } => {
                let event = CalendarEvent::new(&title, &start, &end);
                let created = self.calendar.create_event(&event).await?;
                log::info!("created calendar event {} starting {}", created.id, start);
                Ok(AssistantReply::text("Event created.").with_event_link(created.html_link))
            }
        }
    }

    pub async fn list_notes(&self) -> AssistantResult<AssistantReply> {
        let notes = self.notes.list_all().await?;
        let response = if notes.is_empty() {
            "No notes found."
        } else {
            "Here are all your notes:"
        };
        Ok(AssistantReply::text(response).with_notes(notes))
    }
}
