//! Static resource schemas.
//!
//! A [`Schema`] declares, for every attribute of a resource kind, its value
//! type, presence flags, validators, static default and wire name. Schemas are
//! built once (typically in a `LazyLock`) and read-only afterwards.

mod validators;

pub use validators::Validator;

use std::fmt;

use heck::ToLowerCamelCase;

use crate::diag::Diagnostics;
use crate::path::AttrPath;
use crate::value::{ObjectValue, Value};

/// Declared type of an attribute.
#[derive(Debug, Clone)]
pub enum AttrType {
    String,
    /// RFC 3339 timestamp carried as a string; zero times flatten to null.
    Timestamp,
    Bool,
    Int32,
    Int64,
    Float64,
    List(Box<AttrType>),
    Set(Box<AttrType>),
    /// Mapping of string to string.
    Map,
    Object(Vec<Attribute>),
}

impl AttrType {
    /// Nested fields of an object, or of the elements of a collection of objects.
    #[must_use]
    pub fn fields(&self) -> Option<&[Attribute]> {
        match self {
            AttrType::Object(fields) => Some(fields),
            AttrType::List(elem) | AttrType::Set(elem) => elem.fields(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self, AttrType::Set(_))
    }

    /// Shallow type check; nested elements are checked recursively.
    #[must_use]
    pub fn conforms(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null | Value::Unknown)
            | (AttrType::String | AttrType::Timestamp, Value::String(_))
            | (AttrType::Bool, Value::Bool(_))
            | (AttrType::Int64, Value::Int32(_) | Value::Int64(_))
            | (AttrType::Int32, Value::Int32(_))
            | (AttrType::Float64, Value::Float64(_) | Value::Int32(_) | Value::Int64(_))
            | (AttrType::Map, Value::Map(_))
            | (AttrType::Object(_), Value::Object(_)) => true,
            (AttrType::Int32, Value::Int64(i)) => i32::try_from(*i).is_ok(),
            (AttrType::List(elem), Value::List(items)) | (AttrType::Set(elem), Value::Set(items)) => {
                items.iter().all(|item| !item.is_null() && elem.conforms(item))
            }
            _ => false,
        }
    }

    fn resolve(&mut self, case: WireCase) {
        match self {
            AttrType::Object(fields) => {
                for field in fields {
                    field.resolve(case);
                }
            }
            AttrType::List(elem) | AttrType::Set(elem) => elem.resolve(case),
            _ => {}
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::String => f.write_str("string"),
            AttrType::Timestamp => f.write_str("timestamp"),
            AttrType::Bool => f.write_str("bool"),
            AttrType::Int32 => f.write_str("int32"),
            AttrType::Int64 => f.write_str("int64"),
            AttrType::Float64 => f.write_str("float64"),
            AttrType::List(e) => write!(f, "list of {e}"),
            AttrType::Set(e) => write!(f, "set of {e}"),
            AttrType::Map => f.write_str("map of string"),
            AttrType::Object(_) => f.write_str("object"),
        }
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Set by the backend only.
    Computed,
    /// Set by the operator or, when omitted, by the backend.
    OptionalComputed,
}

/// How an attribute takes part in the outbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireMode {
    /// Null and unknown are left out of the payload.
    #[default]
    Omit,
    /// Null is sent as an explicit JSON `null`.
    SendNull,
    /// Never sent; lives in plan and state only.
    StateOnly,
}

/// Naming convention of a resource's wire payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireCase {
    Snake,
    Camel,
}

impl WireCase {
    fn apply(self, name: &str) -> String {
        match self {
            WireCase::Snake => name.to_owned(),
            WireCase::Camel => name.to_lower_camel_case(),
        }
    }
}

/// One attribute slot of a schema.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: &'static str,
    ty: AttrType,
    presence: Presence,
    sensitive: bool,
    identifier: bool,
    empty_sentinel: bool,
    wire_mode: WireMode,
    default: Option<Value>,
    validators: Vec<Validator>,
    wire_override: Option<&'static str>,
    wire_name: String,
}

impl Attribute {
    fn new(name: &'static str, ty: AttrType) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Optional,
            sensitive: false,
            identifier: false,
            empty_sentinel: false,
            wire_mode: WireMode::Omit,
            default: None,
            validators: Vec::new(),
            wire_override: None,
            wire_name: name.to_owned(),
        }
    }

    #[must_use]
    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttrType::String)
    }

    #[must_use]
    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, AttrType::Timestamp)
    }

    #[must_use]
    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttrType::Bool)
    }

    #[must_use]
    pub fn int32(name: &'static str) -> Self {
        Self::new(name, AttrType::Int32)
    }

    #[must_use]
    pub fn int64(name: &'static str) -> Self {
        Self::new(name, AttrType::Int64)
    }

    #[must_use]
    pub fn float64(name: &'static str) -> Self {
        Self::new(name, AttrType::Float64)
    }

    #[must_use]
    pub fn map(name: &'static str) -> Self {
        Self::new(name, AttrType::Map)
    }

    #[must_use]
    pub fn string_set(name: &'static str) -> Self {
        Self::new(name, AttrType::Set(Box::new(AttrType::String)))
    }

    #[must_use]
    pub fn string_list(name: &'static str) -> Self {
        Self::new(name, AttrType::List(Box::new(AttrType::String)))
    }

    #[must_use]
    pub fn object(name: &'static str, fields: Vec<Attribute>) -> Self {
        Self::new(name, AttrType::Object(fields))
    }

    #[must_use]
    pub fn object_list(name: &'static str, fields: Vec<Attribute>) -> Self {
        Self::new(name, AttrType::List(Box::new(AttrType::Object(fields))))
    }

    #[must_use]
    pub fn object_set(name: &'static str, fields: Vec<Attribute>) -> Self {
        Self::new(name, AttrType::Set(Box::new(AttrType::Object(fields))))
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Optional attribute the backend fills when omitted.
    #[must_use]
    pub fn computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    /// Attribute only the backend sets.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Value cannot change once the resource exists.
    #[must_use]
    pub fn identifier(mut self) -> Self {
        self.identifier = true;
        self
    }

    /// Static default applied when the plan leaves the attribute null.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Explicit wire name, overriding the schema's naming convention.
    #[must_use]
    pub fn wire(mut self, name: &'static str) -> Self {
        self.wire_override = Some(name);
        self
    }

    #[must_use]
    pub fn send_null(mut self) -> Self {
        self.wire_mode = WireMode::SendNull;
        self
    }

    #[must_use]
    pub fn state_only(mut self) -> Self {
        self.wire_mode = WireMode::StateOnly;
        self
    }

    /// A one-element list whose element is all null means "explicitly empty".
    #[must_use]
    pub fn empty_sentinel(mut self) -> Self {
        self.empty_sentinel = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn ty(&self) -> &AttrType {
        &self.ty
    }

    #[must_use]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self.presence, Presence::Computed | Presence::OptionalComputed)
    }

    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.identifier
    }

    #[must_use]
    pub fn has_empty_sentinel(&self) -> bool {
        self.empty_sentinel
    }

    #[must_use]
    pub fn wire_mode(&self) -> WireMode {
        self.wire_mode
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    #[must_use]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    #[must_use]
    pub fn fields(&self) -> Option<&[Attribute]> {
        self.ty.fields()
    }

    fn resolve(&mut self, case: WireCase) {
        self.wire_name = self
            .wire_override
            .map_or_else(|| case.apply(self.name), str::to_owned);
        self.ty.resolve(case);
    }
}

/// Schema of one resource kind.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: &'static str,
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Builds a schema, resolving every wire name against `case`.
    #[must_use]
    pub fn new(type_name: &'static str, case: WireCase, mut attributes: Vec<Attribute>) -> Self {
        for attr in &mut attributes {
            attr.resolve(case);
        }
        Self {
            type_name,
            attributes,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.identifier)
    }

    /// Checks presence, types and per-attribute validators.
    #[must_use]
    pub fn validate(&self, obj: &ObjectValue) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validate_fields(&self.attributes, obj, None, &mut diags);
        diags
    }
}

fn validate_fields(
    attrs: &[Attribute],
    obj: &ObjectValue,
    base: Option<&AttrPath>,
    diags: &mut Diagnostics,
) {
    let path_of = |name: &str| base.map_or_else(|| AttrPath::root(name), |b| b.attr(name));

    for (name, _) in obj.iter() {
        if !attrs.iter().any(|a| a.name == name) {
            diags.attribute_error(
                path_of(name),
                "Unsupported argument",
                format!("An argument named \"{name}\" is not expected here."),
            );
        }
    }

    for attr in attrs {
        let path = path_of(attr.name);
        let value = obj.get(attr.name);
        if value.is_null() {
            if attr.is_required() {
                diags.attribute_error(
                    path,
                    "Missing required argument",
                    format!(
                        "The argument \"{}\" is required, but no definition was found.",
                        attr.name
                    ),
                );
            }
            continue;
        }
        if value.is_unknown() {
            continue;
        }
        validate_value(attr, &attr.ty, &path, value, diags);
    }
}

fn validate_value(
    attr: &Attribute,
    ty: &AttrType,
    path: &AttrPath,
    value: &Value,
    diags: &mut Diagnostics,
) {
    if !ty.conforms(value) {
        diags.attribute_error(
            path.clone(),
            "Incorrect attribute value type",
            format!("Attribute {path} expects {ty}, got {}", value.kind()),
        );
        return;
    }
    for validator in &attr.validators {
        validator.check(path, value, attr.sensitive, diags);
    }
    match (ty, value) {
        (AttrType::Object(fields), Value::Object(obj)) => {
            validate_fields(fields, obj, Some(path), diags);
        }
        (AttrType::List(elem) | AttrType::Set(elem), Value::List(items) | Value::Set(items)) => {
            if let AttrType::Object(fields) = elem.as_ref() {
                for (i, item) in items.iter().enumerate() {
                    if let Value::Object(obj) = item {
                        validate_fields(fields, obj, Some(&path.index(i)), diags);
                    }
                }
            }
        }
        _ => {}
    }
}
