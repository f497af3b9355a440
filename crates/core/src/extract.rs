//! Two-stage recovery of a JSON object from model completion text.
//!
//! Stage one parses the whole (trimmed) text. Stage two takes the greedy span
//! from the first `{` to the last `}` and parses that, which tolerates
//! conversational text or code fences around the object. Only JSON objects are
//! accepted; arrays and scalars fall through to the next stage.

use serde_json::{Map, Value};

/// Which stage produced the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStage {
    Strict,
    BraceSpan,
}

impl ExtractStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::BraceSpan => "brace-span",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub object: Map<String, Value>,
    pub stage: ExtractStage,
}

impl Extraction {
    pub fn into_value(self) -> Value {
        Value::Object(self.object)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("completion contains no JSON object")]
    NoObject,

    #[error("brace-delimited span is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("brace-delimited span is not a JSON object")]
    NotAnObject,
}

/// Run both stages in order.
pub fn extract_object(text: &str) -> Result<Extraction, ExtractError> {
    if let Some(object) = parse_strict(text) {
        return Ok(Extraction {
            object,
            stage: ExtractStage::Strict,
        });
    }
    parse_brace_span(text).map(|object| Extraction {
        object,
        stage: ExtractStage::BraceSpan,
    })
}

/// Stage one: the entire text must be a JSON object.
pub fn parse_strict(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Stage two: parse the greedy `{ … }` span.
pub fn parse_brace_span(text: &str) -> Result<Map<String, Value>, ExtractError> {
    let span = brace_span(text).ok_or(ExtractError::NoObject)?;
    match serde_json::from_str::<Value>(span).map_err(ExtractError::Malformed)? {
        Value::Object(object) => Ok(object),
        _ => Err(ExtractError::NotAnObject),
    }
}

/// The slice from the first `{` through the last `}`, if both exist in order.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then_some(&text[start..=end])
}
