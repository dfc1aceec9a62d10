pub mod calendar_event;
pub mod envelope;
pub mod intent;
pub mod note;
