use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde_json::{Map, Value};

pub const DEFAULT_DURATION_MINUTES: i64 = 60;
pub const DEFAULT_START_HOUR: u32 = 10;
/// Longer durations are treated as model noise and replaced by the default.
pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Calendar fields as the model returned them, before defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarSlots {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration_minutes: Option<i64>,
}

impl CalendarSlots {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let duration_minutes = object.get("duration_minutes").and_then(|value| match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_minutes)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        });

        Self {
            title: text("title"),
            start: text("start").or_else(|| text("start_time")),
            end: text("end").or_else(|| text("end_time")),
            duration_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Fills in whatever the model left out: title falls back to the raw message,
/// start to tomorrow 10:00, end to start plus the duration (60 minutes).
pub fn resolve_schedule(slots: &CalendarSlots, user_message: &str, now: &DateTime<Tz>) -> Schedule {
    let tz = now.timezone();
    let title = slots
        .title
        .clone()
        .unwrap_or_else(|| user_message.trim().to_string());

    let start = match slots.start.as_deref().and_then(|raw| parse_local_time(raw, &tz)) {
        Some(start) => start,
        None => {
            if let Some(raw) = &slots.start {
                log::warn!("unparseable start time {:?}, using default", raw);
            }
            default_start(now)
        }
    };

    let duration = slots
        .duration_minutes
        .filter(|minutes| (1..=MAX_DURATION_MINUTES).contains(minutes))
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    let end = slots
        .end
        .as_deref()
        .and_then(|raw| parse_local_time(raw, &tz))
        .filter(|end| *end > start)
        .or_else(|| offset(&start, duration))
        .or_else(|| offset(&start, DEFAULT_DURATION_MINUTES))
        .unwrap_or(start);

    Schedule { title, start, end }
}

fn offset(start: &DateTime<Tz>, minutes: i64) -> Option<DateTime<Tz>> {
    Duration::try_minutes(minutes).and_then(|delta| start.checked_add_signed(delta))
}

fn whole_minutes(value: f64) -> Option<i64> {
    let rounded = value.round();
    (rounded.is_finite() && rounded.abs() <= MAX_DURATION_MINUTES as f64).then_some(rounded as i64)
}

/// Tomorrow at 10:00 in `now`'s timezone.
pub fn default_start(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tomorrow = now.date_naive() + Duration::days(1);
    let at = NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or_default();
    localize(&tomorrow.and_time(at), &now.timezone())
}

/// RFC 3339 timestamps are converted into `tz`; naive ones are read as `tz` local time.
pub fn parse_local_time(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(tz));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| localize(&naive, tz))
}

fn localize(naive: &NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    tz.from_local_datetime(naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(naive))
}
