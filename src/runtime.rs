use std::sync::Arc;

use crate::config::Settings;
use crate::handlers::action::ActionEngine;
use crate::handlers::http;
use crate::service::calendar_service::GoogleCalendarService;
use crate::service::note_store::SqliteNoteStore;
use crate::service::openai_service::OpenAIService;
use crate::service::routing::OpenAIRouter;

pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

/// Wires the production clients and the SQLite store into an engine.
pub fn build_engine(settings: &Settings) -> Result<ActionEngine, StartupError> {
    let openai = Arc::new(OpenAIService::new(
        settings.require_openai_key()?,
        settings.openai_base_url.clone(),
        settings.openai_model.clone(),
        settings.http_timeout,
    )?);
    let calendar = Arc::new(GoogleCalendarService::new(
        settings.google_credentials_file.clone(),
        settings.google_token_file.clone(),
        settings.calendar_id.clone(),
        settings.http_timeout,
    )?);
    let notes = Arc::new(SqliteNoteStore::open(&settings.db_path)?);

    Ok(ActionEngine::new(
        Arc::new(OpenAIRouter::new(openai)),
        notes,
        calendar,
        settings.timezone,
    ))
}

pub async fn run_api(settings: Settings) -> Result<(), StartupError> {
    let engine = Arc::new(build_engine(&settings)?);
    log::info!(
        "assistant listening on http://{} (model {}, timezone {})",
        settings.addr,
        settings.openai_model,
        settings.timezone
    );
    warp::serve(http::routes(engine)).run(settings.addr).await;
    Ok(())
}
