use std::fmt;

use crate::schema::{AttrType, Attribute, Schema};
use crate::value::{ObjectValue, Value};

const REDACTED: &str = "[REDACTED]";

/// Display adapter that masks every sensitive attribute.
///
/// Use it whenever a plan or state reaches a log line:
/// `tracing::debug!(plan = %Redacted::new(&schema, &plan))`.
pub struct Redacted<'a> {
    attrs: &'a [Attribute],
    value: &'a ObjectValue,
}

impl<'a> Redacted<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, value: &'a ObjectValue) -> Self {
        Self {
            attrs: schema.attributes(),
            value,
        }
    }
}

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_object(f, self.attrs, self.value)
    }
}

fn write_object(f: &mut fmt::Formatter<'_>, attrs: &[Attribute], obj: &ObjectValue) -> fmt::Result {
    f.write_str("{")?;
    for (i, (name, value)) in obj.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name} = ")?;
        match attrs.iter().find(|a| a.name() == name) {
            Some(attr) if attr.is_sensitive() && value.is_known() => f.write_str(REDACTED)?,
            Some(attr) => write_value(f, attr.ty(), value)?,
            None => write!(f, "{value}")?,
        }
    }
    f.write_str("}")
}

fn write_value(f: &mut fmt::Formatter<'_>, ty: &AttrType, value: &Value) -> fmt::Result {
    match (ty.fields(), value) {
        (Some(fields), Value::Object(obj)) => write_object(f, fields, obj),
        (Some(fields), Value::List(items) | Value::Set(items)) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match item {
                    Value::Object(obj) => write_object(f, fields, obj)?,
                    other => write!(f, "{other}")?,
                }
            }
            f.write_str("]")
        }
        _ => write!(f, "{value}"),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::schema::WireCase;

    #[test]
    fn masks_sensitive_attributes_at_any_depth() {
        let schema = Schema::new(
            "webhook",
            WireCase::Snake,
            vec![
                Attribute::string("url"),
                Attribute::object(
                    "apikey_config",
                    vec![Attribute::string("key").sensitive(), Attribute::string("placement")],
                ),
            ],
        );
        let value = ObjectValue::new().with("url", "https://hook").with(
            "apikey_config",
            ObjectValue::new().with("key", "topsecret").with("placement", "header"),
        );
        let shown = Redacted::new(&schema, &value).to_string();
        assert!(!shown.contains("topsecret"), "{shown}");
        assert!(shown.contains("[REDACTED]"));
        assert!(shown.contains("https://hook"));
    }
}
