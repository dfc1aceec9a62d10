use std::sync::Arc;

use assistantBot::error::{CalendarError, LlmError};
use assistantBot::handlers::action::ActionEngine;
use assistantBot::handlers::http::routes;
use assistantBot::models::calendar_event::{CalendarEvent, CreatedEvent};
use assistantBot::service::calendar_service::CalendarClient;
use assistantBot::service::note_store::{MemoryNoteStore, NoteStore};
use assistantBot::service::openai_service::OpenAIClient;
use assistantBot::service::routing::OpenAIRouter;
use chrono_tz::Asia::Kolkata;
use serde_json::{Value, json};
use warp::http::StatusCode;

/// Always answers with the same body.
struct FixedOpenAI(&'static str);

#[async_trait::async_trait]
impl OpenAIClient for FixedOpenAI {
    async fn generate_prompt(&self, _prompt: &str, _prompt_type: &str) -> Result<String, LlmError> {
        Ok(self.0.to_string())
    }
}

struct UnusedCalendar;

#[async_trait::async_trait]
impl CalendarClient for UnusedCalendar {
    async fn create_event(&self, _event: &CalendarEvent) -> Result<CreatedEvent, CalendarError> {
        Err(CalendarError::Auth("calendar not configured".to_string()))
    }
}

fn engine(reply: &'static str, notes: Arc<MemoryNoteStore>) -> Arc<ActionEngine> {
    let router = Arc::new(OpenAIRouter::new(Arc::new(FixedOpenAI(reply))));
    Arc::new(ActionEngine::new(router, notes, Arc::new(UnusedCalendar), Kolkata))
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn handle_note_adds_points_over_http() {
    let notes = Arc::new(MemoryNoteStore::new());
    let api = routes(engine(r#"{"action": "add", "topic": "Groceries"}"#, notes.clone()));

    let res = warp::test::request()
        .method("POST")
        .path("/handle_note")
        .json(&json!({"message": "add to groceries", "points": ["milk", "eggs"]}))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res.body())["response"],
        "Note added for topic 'groceries'."
    );
    assert_eq!(
        notes.get("groceries").await.unwrap(),
        Some(vec!["milk".to_string(), "eggs".to_string()])
    );
}

#[tokio::test]
async fn view_all_notes_lists_store() {
    let notes = Arc::new(MemoryNoteStore::new());
    notes.upsert("books", &["Dune".to_string()]).await.unwrap();
    let api = routes(engine("{}", notes));

    let res = warp::test::request()
        .method("GET")
        .path("/view_all_notes")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res.body())["notes"], json!({"books": ["Dune"]}));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let api = routes(engine("{}", Arc::new(MemoryNoteStore::new())));

    let res = warp::test::request()
        .method("POST")
        .path("/assistant")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res.body())["response"], "Invalid request body.");
}

#[tokio::test]
async fn unknown_path_is_not_found_for_any_method() {
    let api = routes(engine("{}", Arc::new(MemoryNoteStore::new())));

    for method in ["GET", "POST"] {
        let res = warp::test::request()
            .method(method)
            .path("/nope")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", method);
        assert_eq!(body_json(res.body())["response"], "Not found.");
    }
}

#[tokio::test]
async fn wrong_method_on_known_path_is_not_allowed() {
    let api = routes(engine("{}", Arc::new(MemoryNoteStore::new())));

    let get_assistant = warp::test::request()
        .method("GET")
        .path("/assistant")
        .reply(&api)
        .await;
    assert_eq!(get_assistant.status(), StatusCode::METHOD_NOT_ALLOWED);

    let post_notes = warp::test::request()
        .method("POST")
        .path("/view_all_notes")
        .reply(&api)
        .await;
    assert_eq!(post_notes.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(post_notes.body())["response"], "Method not allowed.");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let api = routes(engine("{}", Arc::new(MemoryNoteStore::new())));
    let message = "x".repeat(70 * 1024);

    let res = warp::test::request()
        .method("POST")
        .path("/assistant")
        .json(&json!({"message": message}))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn refused_preflight_is_forbidden() {
    let api = routes(engine("{}", Arc::new(MemoryNoteStore::new())));

    let res = warp::test::request()
        .method("OPTIONS")
        .path("/assistant")
        .header("origin", "https://notes.example")
        .header("access-control-request-method", "DELETE")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(res.body())["response"],
        "Cross-origin request not allowed."
    );
}

#[tokio::test]
async fn allowed_preflight_succeeds() {
    let api = routes(engine("{}", Arc::new(MemoryNoteStore::new())));

    let res = warp::test::request()
        .method("OPTIONS")
        .path("/assistant")
        .header("origin", "https://notes.example")
        .header("access-control-request-method", "POST")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
}
