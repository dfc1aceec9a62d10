use serde_json::{Map, Value};

use crate::error::AssistantError;

/// Pulls the JSON object out of a model reply.
pub trait ResponseExtractor: Send + Sync {
    fn extract(&self, reply: &str) -> Result<Map<String, Value>, AssistantError>;
}

/// Parses the span from the first `{` to the last `}`.
///
/// The span is greedy: prose after the object that itself contains a `}`
/// ends up inside the slice and the parse fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct BraceSpanExtractor;

impl ResponseExtractor for BraceSpanExtractor {
    fn extract(&self, reply: &str) -> Result<Map<String, Value>, AssistantError> {
        let (Some(first), Some(last)) = (reply.find('{'), reply.rfind('}')) else {
            return Err(AssistantError::Extraction("no braces in reply".to_string()));
        };
        if last <= first {
            return Err(AssistantError::Extraction(
                "closing brace precedes opening brace".to_string(),
            ));
        }

        match serde_json::from_str::<Value>(&reply[first..=last]) {
            Ok(Value::Object(object)) => Ok(object),
            Ok(_) => Err(AssistantError::Extraction("span is not an object".to_string())),
            Err(err) => Err(AssistantError::Extraction(err.to_string())),
        }
    }
}
