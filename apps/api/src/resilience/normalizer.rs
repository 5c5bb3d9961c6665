//! Response Normalizer: turns raw model text into a schema-complete result.
//!
//! Models wrap JSON in code fences, prepend chatter, or drop fields. None of that
//! may change the shape callers see: every schema key is always present with a
//! type-correct value, falling back to the field's static default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resilience::task::{FieldKind, FieldSpec, TaskKind};

/// Field name → value mapping carrying exactly one task's schema keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedResult(Map<String, Value>);

impl NormalizedResult {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// Builds a result by filling each schema field from `source` or its default.
    pub fn from_schema(schema: &[FieldSpec], source: &Map<String, Value>) -> Self {
        let mut fields = Map::new();
        for spec in schema {
            fields.insert(spec.name.to_string(), coerce_field(spec, source.get(spec.name)));
        }
        NormalizedResult(fields)
    }
}

/// Normalizes raw model output for `task`. Never fails.
pub fn normalize(raw_text: &str, task: TaskKind) -> NormalizedResult {
    if task.expects_plain_text() {
        let mut source = Map::new();
        source.insert("content".to_string(), Value::String(clean_post_text(raw_text)));
        return NormalizedResult::from_schema(task.schema(), &source);
    }

    let parsed = extract_json_object(raw_text)
        .and_then(|candidate| serde_json::from_str::<Map<String, Value>>(candidate).ok())
        .unwrap_or_default();

    NormalizedResult::from_schema(task.schema(), &parsed)
}

/// Returns the first balanced `{ ... }` region of `text`, ignoring braces inside
/// JSON string literals. `None` when there is no opening brace or it never closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn clean_post_text(raw: &str) -> String {
    raw.trim().replace('"', "")
}

fn coerce_field(spec: &FieldSpec, value: Option<&Value>) -> Value {
    match spec.kind {
        FieldKind::Text { default } => {
            let text = match value {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            Value::String(text.unwrap_or_else(|| default.to_string()))
        }
        FieldKind::Score { min, max, default } => {
            let score = value.and_then(as_integer).unwrap_or(default);
            Value::from(score.clamp(min, max))
        }
        FieldKind::TextList { max_len } => {
            let mut items: Vec<Value> = match value {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .map(Value::String)
                    .collect(),
                _ => Vec::new(),
            };
            if let Some(max_len) = max_len {
                items.truncate(max_len);
            }
            Value::Array(items)
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}
