use serde::Deserialize;
use serde_json::Value;

/// One line of an annotation export. Keys not listed here are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AnnotationRecord {
    pub text: Option<String>,
    pub answer: Option<String>,
    pub tokens: Option<Vec<TokenRecord>>,
    pub spans: Option<Vec<SpanRecord>>,
    #[serde(rename = "_input_hash")]
    pub input_hash: Option<Value>,
    #[serde(rename = "_task_hash")]
    pub task_hash: Option<Value>,
    #[serde(rename = "_timestamp")]
    pub timestamp: Option<Value>,
    #[serde(rename = "_view_id")]
    pub view_id: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TokenRecord {
    pub text: Option<String>,
    pub id: Option<Value>,
    pub start: Option<Value>,
    pub end: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SpanRecord {
    pub text: Option<String>,
    pub label: Option<String>,
    pub start: Option<Value>,
    pub end: Option<Value>,
    pub token_start: Option<Value>,
    pub token_end: Option<Value>,
}

/// Text form of a scalar: strings verbatim, numbers and booleans in their
/// JSON form, absent or null as the empty string.
pub(crate) fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
