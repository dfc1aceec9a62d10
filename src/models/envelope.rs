use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::note::NotePoints;

/// Body of `POST /assistant`, `/handle_note` and `/schedule_event`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub points: Option<NotePoints>,
}

/// The `{ response, ... }` shape every endpoint returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssistantReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<BTreeMap<String, Vec<String>>>,
}

impl AssistantReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }

    pub fn with_points(mut self, points: Vec<String>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_event_link(mut self, link: Option<String>) -> Self {
        self.event_link = link;
        self
    }

    pub fn with_notes(mut self, notes: BTreeMap<String, Vec<String>>) -> Self {
        self.notes = Some(notes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() {
        let body = serde_json::to_value(AssistantReply::text("Event created.")).unwrap();
        assert_eq!(body, serde_json::json!({"response": "Event created."}));
    }

    #[test]
    fn request_accepts_missing_points() {
        let request: AssistantRequest =
            serde_json::from_str(r#"{"message":"what is on my groceries list"}"#).unwrap();
        assert!(request.points.is_none());
    }
}
