use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::clients::google_auth::GoogleSession;
use crate::error::CalendarError;
use crate::models::calendar_event::{CalendarEvent, CreatedEvent};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleCalendarHttp {
    http: reqwest::Client,
    calendar_id: String,
    session: Mutex<GoogleSession>,
}

impl GoogleCalendarHttp {
    pub fn new(
        credentials_path: PathBuf,
        token_path: PathBuf,
        calendar_id: String,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            calendar_id,
            session: Mutex::new(GoogleSession::new(credentials_path, token_path)),
        })
    }

    pub async fn insert_event(&self, event: &CalendarEvent) -> Result<CreatedEvent, CalendarError> {
        // Held across the refresh so concurrent inserts refresh once.
        let access_token = {
            let mut session = self.session.lock().await;
            session.access_token(&self.http).await?
        };

        let response = self
            .http
            .post(format!("{}/calendars/{}/events", CALENDAR_API, self.calendar_id))
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CalendarError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| CalendarError::Response(format!("failed to parse created event: {}", e)))
    }
}
