//! Topic notes persistence.
//!
//! Topics are keyed by their normalized form (see [`normalize_topic`]). An
//! upsert replaces the stored points wholesale; nothing is ever merged or
//! deleted. One mutex guards each store, so writes never interleave.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;

use crate::error::{AssistantError, AssistantResult};
use crate::models::note::{Note, normalize_topic};

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Replaces whatever is stored under `topic` with `points`.
    async fn upsert(&self, topic: &str, points: &[String]) -> AssistantResult<Note>;
    /// `Ok(None)` when the topic was never written.
    async fn get(&self, topic: &str) -> AssistantResult<Option<Vec<String>>>;
    async fn list_all(&self) -> AssistantResult<BTreeMap<String, Vec<String>>>;
}

/// SQLite-backed store. Each call runs on the blocking pool.
pub struct SqliteNoteStore {
    conn: Arc<StdMutex<Connection>>,
}

impl SqliteNoteStore {
    pub fn open(path: impl AsRef<Path>) -> AssistantResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AssistantError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path)?;
        log::info!("opened notes database at {}", path.display());
        Self::bootstrap(conn)
    }

    pub fn open_in_memory() -> AssistantResult<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> AssistantResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (topic TEXT PRIMARY KEY, points TEXT NOT NULL)",
            [],
        )?;
        Ok(Self {
            conn: Arc::new(StdMutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, work: F) -> AssistantResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> AssistantResult<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| AssistantError::Storage("notes connection poisoned".to_string()))?;
            work(&conn)
        })
        .await
        .map_err(|e| AssistantError::Storage(format!("notes task failed: {}", e)))?
    }
}

fn decode_points(topic: &str, raw: &str) -> AssistantResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        AssistantError::Storage(format!("corrupt points for topic '{}': {}", topic, e))
    })
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn upsert(&self, topic: &str, points: &[String]) -> AssistantResult<Note> {
        let topic = normalize_topic(topic);
        let encoded =
            serde_json::to_string(points).map_err(|e| AssistantError::Storage(e.to_string()))?;

        let key = topic.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO notes (topic, points) VALUES (?1, ?2)",
                params![key, encoded],
            )?;
            Ok(())
        })
        .await?;

        Ok(Note {
            topic,
            points: points.to_vec(),
        })
    }

    async fn get(&self, topic: &str) -> AssistantResult<Option<Vec<String>>> {
        let topic = normalize_topic(topic);
        self.with_conn(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT points FROM notes WHERE topic = ?1",
                    params![topic],
                    |row| row.get(0),
                )
                .optional()?;
            raw.map(|raw| decode_points(&topic, &raw)).transpose()
        })
        .await
    }

    async fn list_all(&self) -> AssistantResult<BTreeMap<String, Vec<String>>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT topic, points FROM notes ORDER BY topic")?;
            let rows =
                stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

            let mut notes = BTreeMap::new();
            for row in rows {
                let (topic, raw) = row?;
                let points = decode_points(&topic, &raw)?;
                notes.insert(topic, points);
            }
            Ok(notes)
        })
        .await
    }
}

/// Non-durable store for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn upsert(&self, topic: &str, points: &[String]) -> AssistantResult<Note> {
        let topic = normalize_topic(topic);
        let mut notes = self.notes.lock().await;
        notes.insert(topic.clone(), points.to_vec());
        Ok(Note {
            topic,
            points: points.to_vec(),
        })
    }

    async fn get(&self, topic: &str) -> AssistantResult<Option<Vec<String>>> {
        let notes = self.notes.lock().await;
        Ok(notes.get(&normalize_topic(topic)).cloned())
    }

    async fn list_all(&self) -> AssistantResult<BTreeMap<String, Vec<String>>> {
        let notes = self.notes.lock().await;
        Ok(notes.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn sqlite_round_trip_and_overwrite() {
        let store = SqliteNoteStore::open_in_memory().unwrap();

        store.upsert("groceries", &points(&["milk", "eggs"])).await.unwrap();
        assert_eq!(
            store.get("groceries").await.unwrap(),
            Some(points(&["milk", "eggs"]))
        );

        store.upsert("groceries", &points(&["bread"])).await.unwrap();
        assert_eq!(store.get("groceries").await.unwrap(), Some(points(&["bread"])));
    }

    #[tokio::test]
    async fn unknown_topic_is_none() {
        let store = SqliteNoteStore::open_in_memory().unwrap();
        assert_eq!(store.get("nothing here").await.unwrap(), None);

        let memory = MemoryNoteStore::new();
        assert_eq!(memory.get("nothing here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn differently_cased_topics_share_a_row() {
        let store = SqliteNoteStore::open_in_memory().unwrap();
        let note = store.upsert("  Project   Ideas ", &points(&["a"])).await.unwrap();
        assert_eq!(note.topic, "project ideas");
        assert_eq!(store.get("PROJECT IDEAS").await.unwrap(), Some(points(&["a"])));
    }

    #[tokio::test]
    async fn list_all_is_sorted_by_topic() {
        let store = SqliteNoteStore::open_in_memory().unwrap();
        store.upsert("work", &points(&["ship it"])).await.unwrap();
        store.upsert("books", &points(&["Dune"])).await.unwrap();

        let all = store.list_all().await.unwrap();
        let topics: Vec<&String> = all.keys().collect();
        assert_eq!(topics, vec!["books", "work"]);
        assert_eq!(all["work"], points(&["ship it"]));
    }

    #[tokio::test]
    async fn corrupt_row_is_storage_error() {
        let store = SqliteNoteStore::open_in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO notes (topic, points) VALUES ('broken', 'not json')",
                [],
            )
            .unwrap();
        }
        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, AssistantError::Storage(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn store_calls_interleave_with_other_tasks() {
        let store = std::sync::Arc::new(SqliteNoteStore::open_in_memory().unwrap());
        let ticker = tokio::spawn(async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            "ticked"
        });

        store.upsert("errands", &points(&["post office"])).await.unwrap();
        assert_eq!(ticker.await.unwrap(), "ticked");
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}
