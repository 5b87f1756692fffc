use crate::utils::error::HelperError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded response item: string keys to scalars or nested records.
pub type Record = Map<String, Value>;

/// Flat output of the remapper, in key-map processing order.
pub type FormattedRecord = Map<String, Value>;

/// What to do with one source field.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSpec {
    /// Write the value under the source field's own name.
    UseSameName,
    /// Write the value under a different name.
    RenameTo(String),
    /// The source field holds a record; pull fields out of it with this map
    /// and flatten them into the current level.
    Nested(KeyMap),
}

impl TargetSpec {
    /// Output key for a value copied as-is. `Nested` falls back to the
    /// source key when the source value turned out to be a scalar.
    pub fn output_key<'a>(&'a self, source_key: &'a str) -> &'a str {
        match self {
            TargetSpec::RenameTo(name) => name,
            TargetSpec::UseSameName | TargetSpec::Nested(_) => source_key,
        }
    }

    fn from_value(path: &str, value: Value) -> Result<Self, HelperError> {
        match value {
            Value::Null => Ok(TargetSpec::UseSameName),
            Value::String(s) if s.is_empty() => Ok(TargetSpec::UseSameName),
            Value::String(s) => Ok(TargetSpec::RenameTo(s)),
            Value::Object(obj) => Ok(TargetSpec::Nested(KeyMap::from_object(path, obj)?)),
            other => Err(HelperError::InvalidKeyMapEntry {
                path: path.to_string(),
                found: value_kind(&other).to_string(),
            }),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            TargetSpec::UseSameName => Value::Null,
            TargetSpec::RenameTo(name) => Value::String(name.clone()),
            TargetSpec::Nested(map) => Value::Object(map.to_object()),
        }
    }
}

/// Ordered description of which fields to extract and how to name them.
///
/// Entries keep their insertion order; the remapper walks them in that order,
/// which decides the winner when two entries write the same output key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct KeyMap {
    entries: Vec<(String, TargetSpec)>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn same(self, source: impl Into<String>) -> Self {
        self.with_entry(source, TargetSpec::UseSameName)
    }

    pub fn rename(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        let spec = if target.is_empty() {
            TargetSpec::UseSameName
        } else {
            TargetSpec::RenameTo(target)
        };
        self.with_entry(source, spec)
    }

    pub fn nested(self, source: impl Into<String>, key_map: KeyMap) -> Self {
        self.with_entry(source, TargetSpec::Nested(key_map))
    }

    /// Adds an entry, replacing any earlier entry for the same source field
    /// in place.
    pub fn with_entry(mut self, source: impl Into<String>, spec: TargetSpec) -> Self {
        let source = source.into();
        match self.entries.iter_mut().find(|(k, _)| *k == source) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((source, spec)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetSpec)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, source: &str) -> Option<&TargetSpec> {
        self.entries
            .iter()
            .find(|(k, _)| k == source)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_object(prefix: &str, obj: Map<String, Value>) -> Result<Self, HelperError> {
        let mut entries = Vec::with_capacity(obj.len());
        for (key, value) in obj {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            let spec = TargetSpec::from_value(&path, value)?;
            entries.push((key, spec));
        }
        Ok(Self { entries })
    }

    fn to_object(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect()
    }
}

impl TryFrom<Value> for KeyMap {
    type Error = HelperError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(obj) => KeyMap::from_object("", obj),
            // 空的 YAML 文件解析為 null
            Value::Null => Ok(KeyMap::new()),
            other => Err(HelperError::InvalidKeyMapEntry {
                path: "<root>".to_string(),
                found: value_kind(&other).to_string(),
            }),
        }
    }
}

impl From<KeyMap> for Value {
    fn from(key_map: KeyMap) -> Self {
        Value::Object(key_map.to_object())
    }
}

/// Result of reshaping one record or a batch of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Formatted {
    Single(FormattedRecord),
    Batch(Vec<FormattedRecord>),
}

impl Formatted {
    pub fn record_count(&self) -> usize {
        match self {
            Formatted::Single(_) => 1,
            Formatted::Batch(records) => records.len(),
        }
    }

    pub fn into_records(self) -> Vec<FormattedRecord> {
        match self {
            Formatted::Single(record) => vec![record],
            Formatted::Batch(records) => records,
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
