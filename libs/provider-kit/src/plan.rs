//! Pure plan transformations run before a resource reaches the backend.

use crate::diag::Diagnostics;
use crate::path::AttrPath;
use crate::schema::{AttrType, Attribute, Schema};
use crate::value::{ObjectValue, Value};

/// Promotes common-default values into unset top-level attributes.
///
/// For every field of the `defaults_attr` object that also exists at top
/// level, the top-level value wins unless it is null or unknown. Attributes
/// missing from the defaults object are left untouched.
#[must_use]
pub fn merge_common_defaults(plan: &ObjectValue, defaults_attr: &str, schema: &Schema) -> ObjectValue {
    let mut merged = plan.clone();
    let Ok(defaults) = plan.get(defaults_attr).as_object() else {
        return merged;
    };
    let Some(fields) = schema.attribute(defaults_attr).and_then(Attribute::fields) else {
        return merged;
    };
    for field in fields {
        if schema.attribute(field.name()).is_none() {
            continue;
        }
        let top = plan.get(field.name());
        if top.is_null() || top.is_unknown() {
            let fallback = defaults.get(field.name());
            if fallback.is_known() || top.is_null() {
                merged.set(field.name(), fallback.clone());
            }
        }
    }
    merged
}

/// Fills null attributes that declare a static default, recursing into
/// known nested objects.
#[must_use]
pub fn apply_static_defaults(plan: &ObjectValue, schema: &Schema) -> ObjectValue {
    apply_defaults_to(plan, schema.attributes())
}

fn apply_defaults_to(obj: &ObjectValue, attrs: &[Attribute]) -> ObjectValue {
    let mut out = obj.clone();
    for attr in attrs {
        let current = obj.get(attr.name());
        match (current, attr.ty()) {
            (Value::Null, _) => {
                if let Some(default) = attr.default_value() {
                    out.set(attr.name(), default.clone());
                }
            }
            (Value::Object(inner), AttrType::Object(fields)) => {
                out.set(attr.name(), Value::Object(apply_defaults_to(inner, fields)));
            }
            _ => {}
        }
    }
    out
}

/// Rejects changes to identifier attributes.
///
/// Unknown plan values, computed attributes the plan leaves null and
/// attributes never assigned in `prior` are not violations; a value that
/// differs from the prior known value is.
#[must_use]
pub fn check_immutable(schema: &Schema, prior: Option<&ObjectValue>, plan: &ObjectValue) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(prior) = prior else {
        return diags;
    };
    for attr in schema.identifiers() {
        let before = prior.get(attr.name());
        let after = plan.get(attr.name());
        let left_to_backend = after.is_null() && attr.is_computed();
        if !before.is_known() || after.is_unknown() || left_to_backend || before == after {
            continue;
        }
        let (old, new) = if attr.is_sensitive() {
            ("(sensitive value)".to_owned(), "(sensitive value)".to_owned())
        } else {
            (before.to_string(), after.to_string())
        };
        diags.attribute_error(
            AttrPath::root(attr.name()),
            "Immutable attribute cannot be changed",
            format!(
                "attribute '{}' cannot be modified once the resource exists (current: {old}, planned: {new}); \
                 create a new resource instead",
                attr.name()
            ),
        );
    }
    diags
}

/// Marks computed attributes the plan leaves open.
///
/// A computed attribute that is still null keeps the prior state's value
/// when there is one and otherwise becomes unknown until apply.
#[must_use]
pub fn mark_computed_unknown(schema: &Schema, plan: &ObjectValue, prior: Option<&ObjectValue>) -> ObjectValue {
    let mut out = plan.clone();
    for attr in schema.attributes() {
        if !attr.is_computed() || !plan.get(attr.name()).is_null() {
            continue;
        }
        let carried = prior.map(|p| p.get(attr.name())).filter(|v| v.is_known());
        out.set(attr.name(), carried.cloned().unwrap_or(Value::Unknown));
    }
    out
}
