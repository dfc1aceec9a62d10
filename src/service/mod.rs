pub mod calendar_service;
pub mod extractor;
pub mod note_store;
pub mod openai_service;
pub mod prompts;
pub mod routing;
pub mod schedule;
