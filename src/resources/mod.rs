//! Typed API resources
//!
//! Every decoded API object becomes a [`Record`]: an insertion-ordered map
//! from field name to [`Value`]. Conversion is purely structural and driven
//! by field name, not schema validation — unknown fields pass through as
//! scalars or plain maps, and constructing a Record from well-formed JSON
//! never fails.
//!
//! Two classes of field names get special treatment:
//! - timestamp fields (`created_at`, `updated_at`, `published_at`) parse into
//!   date-times, with or without fractional seconds;
//! - sub-resource fields (`channel`, `game`, `user`, ...) convert nested
//!   objects into Records of the matching kind, recursively through arrays.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::Map;

/// The kind of API resource a [`Record`] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Channel,
    Clip,
    Comment,
    Follow,
    Game,
    Stream,
    StreamMetadata,
    Team,
    User,
    Video,
    /// Nested object with no recognized resource mapping
    Other,
}

/// Resource kind a nested field converts into, when one is recognized
fn sub_resource_kind(name: &str) -> Option<ResourceKind> {
    match name {
        "channel" => Some(ResourceKind::Channel),
        "videos" => Some(ResourceKind::Video),
        "user" | "owner" => Some(ResourceKind::User),
        "game" => Some(ResourceKind::Game),
        "stream" => Some(ResourceKind::Stream),
        "comments" => Some(ResourceKind::Comment),
        _ => None,
    }
}

/// Fields named like these carry timestamps
fn is_timestamp_field(name: &str) -> bool {
    matches!(name, "created_at" | "updated_at" | "published_at")
}

/// A single field value inside a [`Record`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    DateTime(DateTime<Utc>),
    Record(Record),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

/// One decoded API resource instance
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: ResourceKind,
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record of the given kind
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            fields: IndexMap::new(),
        }
    }

    /// Build a record from a decoded JSON object
    ///
    /// Infallible for well-formed objects: timestamp fields that fail to
    /// parse stay plain strings rather than erroring.
    pub fn construct_from(kind: ResourceKind, values: &Map<String, serde_json::Value>) -> Self {
        let mut record = Self::new(kind);
        for (key, value) in values {
            record.insert(key, convert_field(key, value));
        }
        record
    }

    /// The resource kind this record represents
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Insert a field, stripping any leading underscore prefix from the key
    pub fn insert(&mut self, key: &str, value: Value) {
        let key = key.trim_start_matches('_');
        self.fields.insert(key.to_string(), value);
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get an integer field
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Get a boolean field
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Get a timestamp field
    pub fn get_datetime(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(Value::as_datetime)
    }

    /// Get a nested record field
    pub fn get_record(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(Value::as_record)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

/// Convert one JSON field into a [`Value`], driven by its field name
fn convert_field(name: &str, value: &serde_json::Value) -> Value {
    if let serde_json::Value::Array(items) = value {
        return Value::List(items.iter().map(|item| convert_field(name, item)).collect());
    }

    if is_timestamp_field(name) {
        if let serde_json::Value::String(raw) = value {
            if let Some(dt) = parse_timestamp(raw) {
                return Value::DateTime(dt);
            }
        }
    }

    if let serde_json::Value::Object(map) = value {
        let kind = sub_resource_kind(name).unwrap_or(ResourceKind::Other);
        return Value::Record(Record::construct_from(kind, map));
    }

    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.clone()),
        serde_json::Value::String(s) => Value::String(s.clone()),
        // Arrays and objects handled above
        _ => Value::Null,
    }
}

/// Parse an API timestamp, with or without fractional seconds
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.fZ"))
        .ok()
        .map(|naive| naive.and_utc())
}
