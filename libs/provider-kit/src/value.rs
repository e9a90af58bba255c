//! Tri-state attribute values.
//!
//! Every attribute slot of a plan, state or config holds a [`Value`] that is
//! either *known* (carries a payload), [`Value::Null`] (explicitly unset) or
//! [`Value::Unknown`] (to be computed by the backend during apply).
//!
//! The declared type of a slot lives in the schema, so `Null` and `Unknown`
//! are untyped here.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced when extracting a typed payload from a [`Value`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value is null or unknown.
    #[error("value is {state}, expected a known {expected}")]
    NotKnown {
        state: &'static str,
        expected: &'static str,
    },

    /// The value is known but of another type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// A null-aware attribute value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Unknown,
    String(String),
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    /// Ordered collection; equality is order-sensitive.
    List(Vec<Value>),
    /// Unordered collection without duplicates; equality ignores order.
    Set(Vec<Value>),
    Map(BTreeMap<String, String>),
    Object(ObjectValue),
}

impl Value {
    /// Builds a set, dropping duplicate elements while keeping first occurrences.
    #[must_use]
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Value::Set(out)
    }

    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Set of strings; convenient for scopes, roles and URI collections.
    #[must_use]
    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::set(items.into_iter().map(|s| Value::String(s.into())))
    }

    #[must_use]
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::list(items.into_iter().map(|s| Value::String(s.into())))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    /// Returns true when this value or anything nested in it is unknown.
    #[must_use]
    pub fn contains_unknown(&self) -> bool {
        match self {
            Value::Unknown => true,
            Value::List(items) | Value::Set(items) => items.iter().any(Value::contains_unknown),
            Value::Object(obj) => obj.values().any(Value::contains_unknown),
            _ => false,
        }
    }

    /// Short name of the value's state or payload type.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unknown => "unknown",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    fn not_known(&self, expected: &'static str) -> ValueError {
        if self.is_known() {
            ValueError::TypeMismatch {
                expected,
                found: self.kind(),
            }
        } else {
            ValueError::NotKnown {
                state: self.kind(),
                expected,
            }
        }
    }

    /// # Errors
    /// Fails unless the value is a known string.
    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.not_known("string")),
        }
    }

    /// # Errors
    /// Fails unless the value is a known bool.
    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.not_known("bool")),
        }
    }

    /// Integer payload of either width.
    ///
    /// # Errors
    /// Fails unless the value is a known int32 or int64.
    pub fn as_i64(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int32(i) => Ok(i64::from(*i)),
            Value::Int64(i) => Ok(*i),
            other => Err(other.not_known("integer")),
        }
    }

    /// # Errors
    /// Fails unless the value is a known float64.
    pub fn as_f64(&self) -> Result<f64, ValueError> {
        match self {
            Value::Float64(f) => Ok(*f),
            other => Err(other.not_known("float64")),
        }
    }

    /// Elements of a list or set.
    ///
    /// # Errors
    /// Fails unless the value is a known list or set.
    pub fn as_elements(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::List(items) | Value::Set(items) => Ok(items),
            other => Err(other.not_known("collection")),
        }
    }

    /// # Errors
    /// Fails unless the value is a known map.
    pub fn as_map(&self) -> Result<&BTreeMap<String, String>, ValueError> {
        match self {
            Value::Map(m) => Ok(m),
            other => Err(other.not_known("map")),
        }
    }

    /// # Errors
    /// Fails unless the value is a known object.
    pub fn as_object(&self) -> Result<&ObjectValue, ValueError> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.not_known("object")),
        }
    }

    /// String payload, `None` for null, unknown or another type.
    #[must_use]
    pub fn str_opt(&self) -> Option<&str> {
        self.as_str().ok()
    }

    /// Returns true for a known, non-empty collection or map.
    #[must_use]
    pub fn is_non_empty(&self) -> bool {
        match self {
            Value::List(items) | Value::Set(items) => !items.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_)
            | Value::Bool(_)
            | Value::Int32(_)
            | Value::Int64(_)
            | Value::Float64(_) => true,
            Value::Null | Value::Unknown => false,
        }
    }

    /// Replaces nested unknowns with null.
    #[must_use]
    pub fn without_unknowns(self) -> Self {
        match self {
            Value::Unknown => Value::Null,
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .filter(|v| !v.is_unknown())
                    .map(Value::without_unknowns)
                    .collect(),
            ),
            Value::Set(items) => Value::Set(
                items
                    .into_iter()
                    .filter(|v| !v.is_unknown())
                    .map(Value::without_unknowns)
                    .collect(),
            ),
            Value::Object(obj) => Value::Object(obj.without_unknowns()),
            other => other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Unknown, Value::Unknown) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.contains(x))
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<ObjectValue> for Value {
    fn from(o: ObjectValue) -> Self {
        Value::Object(o)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Unknown => f.write_str("(known after apply)"),
            Value::String(s) => write!(f, "\"{}\"", s.escape_default()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(i) => write!(f, "{i}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(x) => write!(f, "{x}"),
            Value::List(items) => write_seq(f, "[", items, "]"),
            Value::Set(items) => write_seq(f, "{", items, "}"),
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} = \"{}\"", v.escape_default())?;
                }
                f.write_str("}")
            }
            Value::Object(obj) => write!(f, "{obj}"),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}

static NULL: Value = Value::Null;

/// Named fields of a plan, state, config or nested object.
///
/// Absent fields read as [`Value::Null`], so an absent field and an explicit
/// null compare equal.
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    fields: BTreeMap<String, Value>,
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        self.fields
            .keys()
            .chain(other.fields.keys())
            .all(|name| self.get(name) == other.get(name))
    }
}

impl ObjectValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&NULL)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Value {
        self.fields.remove(name).unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    /// True when every field is null.
    #[must_use]
    pub fn all_null(&self) -> bool {
        self.fields.values().all(Value::is_null)
    }

    #[must_use]
    pub fn without_unknowns(self) -> Self {
        Self {
            fields: self
                .fields
                .into_iter()
                .map(|(k, v)| (k, v.without_unknowns()))
                .collect(),
        }
    }

    /// Convenience for typed string reads; null and unknown map to `None`.
    #[must_use]
    pub fn str_of(&self, name: &str) -> Option<&str> {
        self.get(name).str_opt()
    }

    #[must_use]
    pub fn bool_of(&self, name: &str) -> Option<bool> {
        self.get(name).as_bool().ok()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ObjectValue {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k} = {v}")?;
        }
        f.write_str("}")
    }
}

// Or-null helpers: turn possibly-empty native payloads into values.

/// Empty or missing strings become null.
#[must_use]
pub fn string_or_null(s: Option<&str>) -> Value {
    match s {
        Some(s) if !s.is_empty() => Value::String(s.to_owned()),
        _ => Value::Null,
    }
}

/// Missing timestamps and zero timestamps become null.
///
/// Both the UNIX epoch and the year-one zero time some backends emit for
/// "never" count as zero.
#[must_use]
pub fn time_or_null(t: Option<DateTime<Utc>>) -> Value {
    match t {
        Some(t) if t.timestamp() != 0 && !is_year_one_zero(t) => {
            Value::String(t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
        }
        _ => Value::Null,
    }
}

fn is_year_one_zero(t: DateTime<Utc>) -> bool {
    const YEAR_ONE_ZERO_SECS: i64 = -62_135_596_800;
    t.timestamp() == YEAR_ONE_ZERO_SECS && t.timestamp_subsec_nanos() == 0
}

/// Present booleans are always known; `false` is a legal value.
#[must_use]
pub fn bool_or_null(b: Option<bool>) -> Value {
    b.map_or(Value::Null, Value::Bool)
}

/// Present integers are always known; zero is a legal value.
#[must_use]
pub fn int32_or_null(i: Option<i32>) -> Value {
    i.map_or(Value::Null, Value::Int32)
}

#[must_use]
pub fn int64_or_null(i: Option<i64>) -> Value {
    i.map_or(Value::Null, Value::Int64)
}

#[must_use]
pub fn float64_or_null(f: Option<f64>) -> Value {
    f.map_or(Value::Null, Value::Float64)
}

/// Empty lists become null.
#[must_use]
pub fn list_or_null(items: Vec<Value>) -> Value {
    if items.is_empty() {
        Value::Null
    } else {
        Value::List(items)
    }
}

/// Empty sets become null; duplicates are dropped.
#[must_use]
pub fn set_or_null(items: Vec<Value>) -> Value {
    if items.is_empty() {
        Value::Null
    } else {
        Value::set(items)
    }
}

/// Empty maps become null.
#[must_use]
pub fn map_or_null(m: BTreeMap<String, String>) -> Value {
    if m.is_empty() {
        Value::Null
    } else {
        Value::Map(m)
    }
}
