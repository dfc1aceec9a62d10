use thiserror::Error;

/// Failures that can happen while handling one assistant request.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("no JSON object in model reply: {0}")]
    Extraction(String),

    #[error("unrecognized intent: {0}")]
    Classification(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Calendar(#[from] CalendarError),

    #[error("{0}")]
    Llm(#[from] LlmError),
}

impl From<rusqlite::Error> for AssistantError {
    fn from(err: rusqlite::Error) -> Self {
        AssistantError::Storage(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request to model failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model request failed with status {0}")]
    Status(u16),

    #[error("unexpected model response: {0}")]
    Response(String),
}

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("calendar authentication failed: {0}")]
    Auth(String),

    #[error("calendar request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("calendar API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected calendar response: {0}")]
    Response(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },

    #[error("{0}")]
    File(String),
}

pub type AssistantResult<T> = Result<T, AssistantError>;
