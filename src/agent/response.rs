//! Agent response shapes and best-effort text extraction.

use std::fmt;

use serde_json::{Map, Value};

use crate::types::ModelMessage;

/// Keys checked, in order, when a response carries no usable message list.
pub const FALLBACK_KEYS: [&str; 4] = ["output", "response", "final", "final_response"];

/// One entry of a response's message list.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseMessage {
    /// A loosely-typed JSON object (e.g. `{"role": ..., "content": ...}`).
    Mapping(Map<String, Value>),
    /// A typed conversation message.
    Message(ModelMessage),
    /// Anything else.
    Other(Value),
}

impl ResponseMessage {
    fn to_value(&self) -> Value {
        match self {
            Self::Mapping(map) => Value::Object(map.clone()),
            Self::Message(message) => serde_json::to_value(message).unwrap_or(Value::Null),
            Self::Other(value) => value.clone(),
        }
    }
}

/// Whatever the agent handed back for a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    /// A message list plus any other top-level fields.
    StructuredMessages {
        messages: Vec<ResponseMessage>,
        fields: Map<String, Value>,
    },
    /// A mapping without a message list.
    KeyedFields(Map<String, Value>),
    /// Anything else.
    Opaque(Value),
}

impl AgentResponse {
    /// Wrap a typed transcript.
    pub fn from_messages(messages: Vec<ModelMessage>) -> Self {
        Self::StructuredMessages {
            messages: messages.into_iter().map(ResponseMessage::Message).collect(),
            fields: Map::new(),
        }
    }

    /// Classify an arbitrary JSON value.
    ///
    /// Only a non-empty `messages` array makes a structured response; a mapping
    /// with an empty or non-array `messages` stays keyed so the fallback keys
    /// still apply.
    pub fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => return Self::Opaque(other),
        };
        match map.get("messages") {
            Some(Value::Array(items)) if !items.is_empty() => {}
            _ => return Self::KeyedFields(map),
        }
        let messages = match map.remove("messages") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(entry) => ResponseMessage::Mapping(entry),
                    other => ResponseMessage::Other(other),
                })
                .collect(),
            _ => Vec::new(),
        };
        Self::StructuredMessages {
            messages,
            fields: map,
        }
    }

    /// JSON form of the whole response.
    pub fn to_value(&self) -> Value {
        match self {
            Self::StructuredMessages { messages, fields } => {
                let mut map = Map::with_capacity(fields.len() + 1);
                map.insert(
                    "messages".into(),
                    Value::Array(messages.iter().map(ResponseMessage::to_value).collect()),
                );
                map.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(map)
            }
            Self::KeyedFields(map) => Value::Object(map.clone()),
            Self::Opaque(value) => value.clone(),
        }
    }

    /// Best-effort display string for the reply. Never fails.
    pub fn extract_text(&self) -> String {
        if let Self::StructuredMessages { messages, .. } = self {
            match messages.last() {
                Some(ResponseMessage::Mapping(map)) => {
                    return match map.get("content").filter(|v| is_truthy(v)) {
                        Some(content) => render(content),
                        None => Value::Object(map.clone()).to_string(),
                    };
                }
                Some(ResponseMessage::Message(message)) => {
                    let text = message.text();
                    if !text.is_empty() {
                        return text;
                    }
                }
                Some(ResponseMessage::Other(_)) | None => {}
            }
        }

        if let Some(fields) = self.fields() {
            if let Some(value) = FALLBACK_KEYS
                .iter()
                .filter_map(|key| fields.get(*key))
                .find(|v| is_truthy(v))
            {
                return render(value);
            }
        }

        self.to_string()
    }

    fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::StructuredMessages { fields, .. } => Some(fields),
            Self::KeyedFields(map) => Some(map),
            Self::Opaque(_) => None,
        }
    }
}

impl From<Value> for AgentResponse {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl fmt::Display for AgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opaque(Value::String(text)) => f.write_str(text),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
