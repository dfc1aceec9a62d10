use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Note {
    pub topic: String,
    pub points: Vec<String>,
}

/// Canonical key for a topic: trimmed, inner whitespace collapsed, lowercased.
pub fn normalize_topic(topic: &str) -> String {
    topic
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `points` as posted by clients: a JSON list, or one newline-separated string
/// straight from a text area.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NotePoints {
    List(Vec<String>),
    Text(String),
}

impl NotePoints {
    /// Trimmed, non-blank points. `None` when nothing usable was sent.
    pub fn into_points(self) -> Option<Vec<String>> {
        let raw = match self {
            NotePoints::List(items) => items,
            NotePoints::Text(text) => text.lines().map(str::to_string).collect(),
        };
        let points: Vec<String> = raw
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if points.is_empty() { None } else { Some(points) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_topic_folds_case_and_whitespace() {
        assert_eq!(normalize_topic("  Weekly   Groceries "), "weekly groceries");
        assert_eq!(normalize_topic("groceries"), normalize_topic("GROCERIES"));
    }

    #[test]
    fn text_points_split_on_lines() {
        let points: NotePoints = serde_json::from_str("\"milk\\n  eggs \\n\\n\"").unwrap();
        assert_eq!(
            points.into_points(),
            Some(vec!["milk".to_string(), "eggs".to_string()])
        );
    }

    #[test]
    fn blank_points_count_as_missing() {
        let points: NotePoints = serde_json::from_str("[\" \", \"\"]").unwrap();
        assert_eq!(points.into_points(), None);
        assert_eq!(NotePoints::Text(String::new()).into_points(), None);
    }
}
