use serde_json::Value;
use thiserror::Error;

use crate::common::{ChatMessage, RawMessage};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("message is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported message entry: {0}")]
    Unsupported(Value),
    #[error("message has no {0}")]
    MissingField(&'static str),
}

/// Turns one entry of the `messages` array into a [`ChatMessage`].
///
/// Encoded strings are parsed first. A message whose `username` or `content`
/// is absent or empty is rejected.
pub fn normalize(raw: RawMessage) -> Result<ChatMessage, NormalizeError> {
    let object = match raw {
        RawMessage::Object(object) => object,
        RawMessage::Encoded(text) => match serde_json::from_str::<Value>(&text)? {
            Value::Object(object) => object,
            other => return Err(NormalizeError::Unsupported(other)),
        },
        RawMessage::Unsupported(other) => return Err(NormalizeError::Unsupported(other)),
    };

    for field in ["username", "content"] {
        match object.get(field) {
            Some(Value::String(text)) if !text.is_empty() => {}
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(NormalizeError::MissingField(field));
            }
            Some(_) => {}
        }
    }

    Ok(serde_json::from_value(Value::Object(object))?)
}
