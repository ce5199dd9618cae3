//! The persisted settings record and incoming form submissions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldsError, Result};
use crate::types::SettingValue;

/// The aggregate stored for one settings page: field id → sanitized value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SettingsRecord {
    values: IndexMap<String, SettingValue>,
}

impl SettingsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&SettingValue> {
        self.values.get(field_id)
    }

    pub fn insert(&mut self, field_id: impl Into<String>, value: SettingValue) -> Option<SettingValue> {
        self.values.insert(field_id.into(), value)
    }

    /// Overwrite entries present in `other`, keeping everything else.
    pub fn merge(&mut self, other: SettingsRecord) {
        for (id, value) in other.values {
            self.values.insert(id, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, SettingValue)> for SettingsRecord {
    fn from_iter<T: IntoIterator<Item = (String, SettingValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Raw values submitted for one page, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    values: IndexMap<String, Value>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field_id: impl Into<String>, raw: impl Into<Value>) -> Self {
        self.values.insert(field_id.into(), raw.into());
        self
    }

    /// From a JSON object body.
    pub fn from_json(body: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            Ok(_) => Err(FieldsError::InvalidDefinition {
                message: "submission must be a JSON object".to_string(),
            }),
            Err(e) => Err(FieldsError::InvalidDefinition {
                message: format!("submission is not valid JSON: {e}"),
            }),
        }
    }

    /// From form-style `name=value` pairs. `name[]` keys and repeated names
    /// collect into an array.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values: IndexMap<String, Value> = IndexMap::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = Value::String(value.into());
            match key.strip_suffix("[]") {
                Some(base) => match values.entry(base.to_string()).or_insert_with(|| Value::Array(Vec::new())) {
                    Value::Array(items) => items.push(value),
                    other => *other = Value::Array(vec![other.take(), value]),
                },
                None => match values.get_mut(key) {
                    Some(Value::Array(items)) => items.push(value),
                    Some(existing) => *existing = Value::Array(vec![existing.take(), value]),
                    None => {
                        values.insert(key.to_string(), value);
                    }
                },
            }
        }
        Self { values }
    }

    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
