use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

const POPUP_REMINDER_MINUTES: i64 = 10;

/// Event body accepted by the Google Calendar `events.insert` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

impl EventDateTime {
    fn from_zoned(time: &DateTime<Tz>) -> Self {
        Self {
            date_time: time.to_rfc3339(),
            time_zone: time.timezone().name().to_string(),
        }
    }
}

impl CalendarEvent {
    pub fn new(summary: &str, start: &DateTime<Tz>, end: &DateTime<Tz>) -> Self {
        Self {
            summary: summary.to_string(),
            start: EventDateTime::from_zoned(start),
            end: EventDateTime::from_zoned(end),
            reminders: Reminders {
                use_default: false,
                overrides: vec![ReminderOverride {
                    method: "popup".to_string(),
                    minutes: POPUP_REMINDER_MINUTES,
                }],
            },
        }
    }
}

/// The parts of the created event we surface to the user.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    #[serde(default)]
    pub id: String,
    pub html_link: Option<String>,
}
