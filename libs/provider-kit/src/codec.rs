//! Expand (plan to wire record) and flatten (wire record to state).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use crate::diag::Diagnostics;
use crate::path::AttrPath;
use crate::schema::{AttrType, Attribute, Schema, WireMode};
use crate::value::{
    ObjectValue, Value, list_or_null, map_or_null, set_or_null, string_or_null, time_or_null,
};

/// Canonical object tree exchanged with the backend gateway.
pub type Record = serde_json::Map<String, Json>;

/// Operation a flatten call runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Import,
    Update,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Read => "READ",
            Operation::Import => "IMPORT",
            Operation::Update => "UPDATE",
        }
    }

    /// Only writes compare the backend's answer with a submitted plan.
    #[must_use]
    pub fn reports_drift(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource post-apply normalisation rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftPolicy {
    /// Attributes the backend may rewrite; a differing answer is a warning
    /// and the backend value wins.
    pub watched: &'static [&'static str],
    /// Computed set attributes that become `{}` when the response omits them.
    pub empty_sets: &'static [&'static str],
}

/// Converts a plan or state into the outbound record.
///
/// Unknown values are never emitted. Null values are omitted unless the
/// attribute asks for an explicit null.
#[must_use]
pub fn expand(schema: &Schema, obj: &ObjectValue) -> Record {
    expand_fields(schema.attributes(), obj)
}

fn expand_fields(attrs: &[Attribute], obj: &ObjectValue) -> Record {
    let mut out = Record::new();
    for attr in attrs {
        match (attr.wire_mode(), obj.get(attr.name())) {
            (WireMode::StateOnly, _) | (_, Value::Unknown) => {}
            (WireMode::SendNull, Value::Null) => {
                out.insert(attr.wire_name().to_owned(), Json::Null);
            }
            (_, Value::Null) => {}
            (_, value) => {
                if let Some(json) = encode(attr.ty(), value, attr.has_empty_sentinel()) {
                    out.insert(attr.wire_name().to_owned(), json);
                }
            }
        }
    }
    out
}

fn encode(ty: &AttrType, value: &Value, sentinel: bool) -> Option<Json> {
    match (ty, value) {
        (_, Value::Null | Value::Unknown) => None,
        (_, Value::String(s)) => Some(Json::String(s.clone())),
        (_, Value::Bool(b)) => Some(Json::Bool(*b)),
        (_, Value::Int32(i)) => Some(Json::from(*i)),
        (_, Value::Int64(i)) => Some(Json::from(*i)),
        (_, Value::Float64(f)) => serde_json::Number::from_f64(*f).map(Json::Number),
        (AttrType::List(elem) | AttrType::Set(elem), Value::List(items) | Value::Set(items)) => {
            if sentinel && is_empty_sentinel(value) {
                return Some(Json::Array(Vec::new()));
            }
            Some(Json::Array(
                items.iter().filter_map(|item| encode(elem, item, false)).collect(),
            ))
        }
        (_, Value::Map(m)) => Some(Json::Object(
            m.iter()
                .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                .collect(),
        )),
        (AttrType::Object(fields), Value::Object(obj)) => Some(Json::Object(expand_fields(fields, obj))),
        (ty, value) => {
            tracing::debug!(expected = %ty, found = value.kind(), "skipping value that does not match its schema type");
            None
        }
    }
}

/// True for a one-element list whose only element is an object with every
/// field null.
#[must_use]
pub fn is_empty_sentinel(value: &Value) -> bool {
    match value {
        Value::List(items) | Value::Set(items) => {
            matches!(items.as_slice(), [Value::Object(obj)] if obj.all_null())
        }
        _ => false,
    }
}

/// Builds the explicit-empty sentinel for a list of objects with `fields`.
#[must_use]
pub fn empty_sentinel(fields: &[Attribute]) -> Value {
    let element: ObjectValue = fields.iter().map(|f| (f.name(), Value::Null)).collect();
    Value::List(vec![Value::Object(element)])
}

/// Converts a backend record into state.
///
/// For CREATE and UPDATE the basis is the submitted plan: the result is the
/// plan with every unknown resolved from the record, and watched attributes
/// the backend rewrote produce a warning and take the backend value. For
/// READ and IMPORT the basis is the prior state, only used to carry
/// state-only attributes and secrets the backend does not echo.
pub struct Flatten<'a> {
    schema: &'a Schema,
    operation: Operation,
    basis: Option<&'a ObjectValue>,
    policy: DriftPolicy,
}

impl<'a> Flatten<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, operation: Operation) -> Self {
        Self {
            schema,
            operation,
            basis: None,
            policy: DriftPolicy::default(),
        }
    }

    #[must_use]
    pub fn basis(mut self, basis: &'a ObjectValue) -> Self {
        self.basis = Some(basis);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: DriftPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the conversion; drift warnings go to `diags`.
    ///
    /// The returned object never contains unknown values.
    pub fn run(&self, record: &Record, diags: &mut Diagnostics) -> ObjectValue {
        let mut observed = decode_fields(self.schema.attributes(), record);
        self.normalize_empty_sets(&mut observed);
        let state = if self.operation.reports_drift() {
            self.settle_plan(&observed, diags)
        } else {
            self.carry_local(observed)
        };
        state.without_unknowns()
    }

    fn normalize_empty_sets(&self, observed: &mut ObjectValue) {
        for name in self.policy.empty_sets {
            let Some(attr) = self.schema.attribute(name) else {
                continue;
            };
            if attr.ty().is_set() && attr.is_computed() && observed.get(name).is_null() {
                observed.set(*name, Value::Set(Vec::new()));
            }
        }
    }

    fn settle_plan(&self, observed: &ObjectValue, diags: &mut Diagnostics) -> ObjectValue {
        let Some(plan) = self.basis else {
            return observed.clone();
        };
        let mut state = plan.clone();
        for attr in self.schema.attributes() {
            if attr.wire_mode() == WireMode::StateOnly {
                continue;
            }
            let name = attr.name();
            let planned = plan.get(name);
            let backend = observed.get(name);
            let resolved = resolve_unknowns(planned, backend);
            let watched = self.policy.watched.contains(&name);
            if watched && planned.is_known() && backend.is_known() && &resolved != backend {
                diags.attribute_warning(
                    AttrPath::root(name),
                    "Attribute value changed by the backend",
                    drift_detail(attr, &resolved, backend),
                );
                tracing::debug!(
                    attribute = name,
                    operation = %self.operation,
                    "backend value differs from submitted value"
                );
                state.set(name, backend.clone());
                continue;
            }
            state.set(name, resolved);
        }
        state
    }

    fn carry_local(&self, mut observed: ObjectValue) -> ObjectValue {
        let Some(prior) = self.basis else {
            return observed;
        };
        for attr in self.schema.attributes() {
            let name = attr.name();
            let carried = prior.get(name);
            let keep_secret = attr.is_sensitive() && observed.get(name).is_null() && carried.is_known();
            if attr.wire_mode() == WireMode::StateOnly || keep_secret {
                observed.set(name, carried.clone());
            }
        }
        observed
    }
}

fn drift_detail(attr: &Attribute, submitted: &Value, backend: &Value) -> String {
    if attr.is_sensitive() {
        format!(
            "attribute '{}' was normalized by the backend; the backend value is stored in state",
            attr.name()
        )
    } else {
        format!(
            "attribute '{}': submitted {submitted}, backend returned {backend}; \
             the backend value is stored in state",
            attr.name()
        )
    }
}

fn resolve_unknowns(planned: &Value, observed: &Value) -> Value {
    match (planned, observed) {
        (Value::Unknown, _) => observed.clone(),
        (Value::Object(p), Value::Object(o)) if planned.contains_unknown() => Value::Object(
            p.iter()
                .map(|(k, v)| (k, resolve_unknowns(v, o.get(k))))
                .collect(),
        ),
        (p, o) if p.contains_unknown() && o.is_known() => o.clone(),
        (p, _) => p.clone(),
    }
}

fn decode_fields(attrs: &[Attribute], record: &Record) -> ObjectValue {
    attrs
        .iter()
        .filter(|a| a.wire_mode() != WireMode::StateOnly)
        .map(|a| {
            let value = record
                .get(a.wire_name())
                .map_or(Value::Null, |json| decode(a.ty(), json));
            (a.name(), value)
        })
        .collect()
}

fn decode(ty: &AttrType, json: &Json) -> Value {
    match (ty, json) {
        (_, Json::Null) => Value::Null,
        (AttrType::String, Json::String(s)) => string_or_null(Some(s)),
        (AttrType::String, Json::Number(n)) => Value::String(n.to_string()),
        (AttrType::Timestamp, Json::String(s)) => match DateTime::parse_from_rfc3339(s) {
            Ok(t) => time_or_null(Some(t.with_timezone(&Utc))),
            Err(_) => string_or_null(Some(s)),
        },
        (AttrType::Timestamp, Json::Number(n)) => {
            time_or_null(n.as_i64().and_then(DateTime::from_timestamp_millis))
        }
        (AttrType::Bool, Json::Bool(b)) => Value::Bool(*b),
        (AttrType::Int32, Json::Number(n)) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map_or(Value::Null, Value::Int32),
        (AttrType::Int64, Json::Number(n)) => n.as_i64().map_or(Value::Null, Value::Int64),
        (AttrType::Float64, Json::Number(n)) => n.as_f64().map_or(Value::Null, Value::Float64),
        (AttrType::List(elem), Json::Array(items)) => list_or_null(decode_items(elem, items)),
        (AttrType::Set(elem), Json::Array(items)) => set_or_null(decode_items(elem, items)),
        (AttrType::Map, Json::Object(m)) => map_or_null(
            m.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let s = v.as_str().map_or_else(|| v.to_string(), str::to_owned);
                    (k.clone(), s)
                })
                .collect::<BTreeMap<_, _>>(),
        ),
        (AttrType::Object(fields), Json::Object(m)) => Value::Object(decode_fields(fields, m)),
        (ty, json) => {
            tracing::debug!(expected = %ty, found = json_kind(json), "response value does not match its schema type");
            Value::Null
        }
    }
}

fn decode_items(elem: &AttrType, items: &[Json]) -> Vec<Value> {
    items
        .iter()
        .map(|item| decode(elem, item))
        .filter(Value::is_known)
        .collect()
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
