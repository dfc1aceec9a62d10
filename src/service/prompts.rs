use chrono::DateTime;
use chrono_tz::Tz;

/// Which prompt template a request is classified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptScope {
    /// Notes or calendar, decided by the model.
    Assistant,
    /// Notes only: add or retrieve.
    Note,
    /// Calendar event slot extraction only.
    Event,
}

impl PromptScope {
    pub fn prompt_type(&self) -> &'static str {
        match self {
            PromptScope::Assistant => "assistant",
            PromptScope::Note => "note",
            PromptScope::Event => "event",
        }
    }

    pub fn render(&self, user_message: &str, now: &DateTime<Tz>) -> String {
        let now_text = now.format("%Y-%m-%d %H:%M").to_string();
        let timezone = now.timezone().name();
        match self {
            PromptScope::Assistant => format!(
                "You are a helpful assistant. Analyze the user's message and return the intent.\n\
                 Current date and time: {now} ({tz})\n\
                 If it's about notes, output:\n\
                 {{\"action\":\"note\",\"note_action\":\"add\" or \"retrieve\",\"topic\":\"<topic name>\"}}\n\
                 If it's about scheduling a calendar event, output:\n\
                 {{\"action\":\"calendar\",\"title\":\"<event title>\",\"start\":\"YYYY-MM-DD HH:MM\",\"end\":\"YYYY-MM-DD HH:MM\"}}\n\
                 Rules:\n\
                 - Times are local to {tz}.\n\
                 - If no start time is given, leave \"start\" out.\n\
                 - Output ONLY raw JSON, no prose, markdown, or code fences.\n\
                 User message: \"{user_message}\"",
                now = now_text,
                tz = timezone,
                user_message = user_message
            ),
            PromptScope::Note => format!(
                "You are a helpful AI assistant that helps manage notes.\n\
                 Task:\n\
                 - Decide if the user wants to ADD or RETRIEVE a note.\n\
                 - Extract the topic name they are referring to.\n\
                 Output ONLY raw JSON, no prose, markdown, or code fences.\n\
                 The JSON shape must be exactly:\n\
                 {{\"action\":\"add|retrieve\",\"topic\":\"<topic name>\"}}\n\
                 User message: \"{user_message}\"",
                user_message = user_message
            ),
            PromptScope::Event => format!(
                "You are a helpful assistant that extracts event information from a user message.\n\
                 Current date and time: {now} ({tz})\n\
                 Extract the following fields:\n\
                 - \"title\": e.g. \"Project Meeting\"\n\
                 - \"start_time\": ISO 8601, local to {tz}\n\
                 - \"duration_minutes\": length of the event in minutes\n\
                 If any information is missing, leave that field out.\n\
                 If the year is omitted, assume the next occurrence of that date on or after today.\n\
                 Output ONLY raw JSON, no prose, markdown, or code fences.\n\
                 The JSON shape must be exactly:\n\
                 {{\"title\":\"<string>\",\"start_time\":\"<ISO 8601>\",\"duration_minutes\":<number>}}\n\
                 User message: \"{user_message}\"",
                now = now_text,
                tz = timezone,
                user_message = user_message
            ),
        }
    }
}
