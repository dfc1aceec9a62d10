use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::google_calendar::GoogleCalendarHttp;
use crate::error::CalendarError;
use crate::models::calendar_event::{CalendarEvent, CreatedEvent};

#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn create_event(&self, event: &CalendarEvent) -> Result<CreatedEvent, CalendarError>;
}

pub struct GoogleCalendarService {
    client: GoogleCalendarHttp,
}

impl GoogleCalendarService {
    pub fn new(
        credentials_path: PathBuf,
        token_path: PathBuf,
        calendar_id: String,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        Ok(Self {
            client: GoogleCalendarHttp::new(credentials_path, token_path, calendar_id, timeout)?,
        })
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarService {
    async fn create_event(&self, event: &CalendarEvent) -> Result<CreatedEvent, CalendarError> {
        self.client.insert_event(event).await
    }
}
