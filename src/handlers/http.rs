use std::convert::Infallible;
use std::sync::Arc;

use chrono::Utc;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use crate::error::{AssistantError, AssistantResult};
use crate::handlers::action::ActionEngine;
use crate::models::envelope::{AssistantReply, AssistantRequest};
use crate::service::prompts::PromptScope;

pub const NOT_UNDERSTOOD: &str = "Sorry, couldn't understand the request.";
pub const STORAGE_FAILED: &str = "Something went wrong while saving your notes.";
pub const MODEL_UNAVAILABLE: &str = "The assistant model is unavailable right now.";

const MAX_BODY_BYTES: u64 = 64 * 1024;

pub fn routes(
    engine: Arc<ActionEngine>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_engine = warp::any().map(move || engine.clone());

    // Path before method, so an unknown path stays a 404 rather than a 405.
    let message_route = |name: &'static str, scope: PromptScope| {
        warp::path(name)
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json())
            .and(with_engine.clone())
            .then(move |request: AssistantRequest, engine: Arc<ActionEngine>| async move {
                into_reply(engine.handle_request(request, scope, Utc::now()).await)
            })
    };

    let view_all_notes = warp::path("view_all_notes")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_engine.clone())
        .then(|engine: Arc<ActionEngine>| async move { into_reply(engine.list_notes().await) });

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_headers(vec!["content-type"]);

    message_route("assistant", PromptScope::Assistant)
        .or(message_route("handle_note", PromptScope::Note))
        .or(message_route("schedule_event", PromptScope::Event))
        .or(view_all_notes)
        .with(cors)
        .recover(handle_rejection)
}

pub fn into_reply(result: AssistantResult<AssistantReply>) -> WithStatus<Json> {
    let (status, reply) = reply_parts(result);
    warp::reply::with_status(warp::reply::json(&reply), status)
}

/// Maps an engine result onto the status code and envelope sent to clients.
pub fn reply_parts(result: AssistantResult<AssistantReply>) -> (StatusCode, AssistantReply) {
    match result {
        Ok(reply) => (StatusCode::OK, reply),
        Err(err) => error_reply(&err),
    }
}

pub fn error_reply(err: &AssistantError) -> (StatusCode, AssistantReply) {
    match err {
        AssistantError::Extraction(_) | AssistantError::Classification(_) => {
            (StatusCode::OK, AssistantReply::text(NOT_UNDERSTOOD))
        }
        AssistantError::Calendar(err) => (
            StatusCode::OK,
            AssistantReply::text(format!("Error creating event: {}", err)),
        ),
        AssistantError::Storage(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, AssistantReply::text(STORAGE_FAILED))
        }
        AssistantError::Llm(_) => (StatusCode::BAD_GATEWAY, AssistantReply::text(MODEL_UNAVAILABLE)),
    }
}

async fn handle_rejection(err: Rejection) -> Result<WithStatus<Json>, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found.")
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid request body.")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
    } else if let Some(forbidden) = err.find::<warp::filters::cors::CorsForbidden>() {
        log::info!("cors request refused: {}", forbidden);
        (StatusCode::FORBIDDEN, "Cross-origin request not allowed.")
    } else {
        log::error!("unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&AssistantReply::text(message)),
        status,
    ))
}
