use chrono::DateTime;
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    Add,
    Retrieve,
}

impl NoteAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "add" => Some(NoteAction::Add),
            "retrieve" => Some(NoteAction::Retrieve),
            _ => None,
        }
    }
}

/// What the model decided the user wants. Built per request, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentDecision {
    Note {
        action: NoteAction,
        topic: String,
    },
    Calendar {
        title: String,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    },
}

impl IntentDecision {
    pub fn label(&self) -> &'static str {
        match self {
            IntentDecision::Note { action: NoteAction::Add, .. } => "note_add",
            IntentDecision::Note { action: NoteAction::Retrieve, .. } => "note_retrieve",
            IntentDecision::Calendar { .. } => "calendar",
        }
    }
}
