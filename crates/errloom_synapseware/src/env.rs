//! Variable environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value stored in the environment.
///
/// Text renders as-is. Structured values render as compact JSON, except JSON
/// strings, which render without quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Json(serde_json::Value),
}

impl Value {
    /// The text form injected into fragments.
    pub fn render(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Json(serde_json::Value::String(text)) => text.clone(),
            Value::Json(json) => json.to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Json(serde_json::Value::String(text)) => Some(text),
            Value::Json(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Variables visible to a run.
///
/// Context breaks never clear the environment, so values written in one
/// context are readable from every later one.
///
/// # Examples
///
/// ```
/// use errloom_synapseware::Environment;
///
/// let mut env = Environment::new();
/// env.set("my_var", "injected_value");
/// assert_eq!(env.get("my_var").map(|v| v.render()), Some("injected_value".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    values: BTreeMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Stores `value` under `name`, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
