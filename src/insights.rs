use serde_json::{Map, Value};

use crate::fmt::money;

/// Shape of the `insights` member of an insights response.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightsPayload {
    Text(String),
    Sections(Vec<InsightSection>),
    Unknown(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightSection {
    pub title: String,
    pub body: String,
}

impl InsightsPayload {
    pub fn from_response(response: &Value) -> Self {
        match response.get("insights") {
            Some(value) => Self::from_value(value),
            None => Self::Unknown(response.clone()),
        }
    }

    /// A string holding a JSON object is unwrapped into sections.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(map)) => Self::sections(&map),
                _ => Self::Text(s.clone()),
            },
            Value::Object(map) => Self::sections(map),
            other => Self::Unknown(other.clone()),
        }
    }

    fn sections(map: &Map<String, Value>) -> Self {
        Self::Sections(
            map.iter()
                .map(|(key, value)| InsightSection {
                    title: section_title(key),
                    body: format_value(value),
                })
                .collect(),
        )
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_word = false;
    for c in key.replace('_', " ").chars() {
        if is_word_char(c) && !prev_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_word = is_word_char(c);
    }
    out
}

pub fn section_title(key: &str) -> String {
    humanize_key(key)
        .replacen("Ai ", "AI ", 1)
        .replacen("Api ", "API ", 1)
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.abs() > 0.01 => money(v),
            _ => n.to_string(),
        },
        Value::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => map
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", format_value(v)))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => format_value(other),
            })
            .collect::<Vec<_>>()
            .join("\n• "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("• {}: {}", humanize_key(k), format_value(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
    }
}
