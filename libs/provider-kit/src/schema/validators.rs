use regex::Regex;

use crate::diag::Diagnostics;
use crate::path::AttrPath;
use crate::value::Value;

/// Single-attribute validation rule.
///
/// Rules only look at known values; null and unknown pass.
#[derive(Debug, Clone)]
pub enum Validator {
    /// String must be one of the listed values.
    OneOf(&'static [&'static str]),
    /// String must match the pattern.
    Matches {
        regex: Regex,
        description: &'static str,
    },
    /// String length in characters.
    Length { min: usize, max: Option<usize> },
    /// Integer range, inclusive.
    Between { min: i64, max: i64 },
    /// Collection must hold at least this many elements.
    SizeAtLeast(usize),
    /// Every string element must be one of the listed values.
    EachOneOf(&'static [&'static str]),
    /// Every string element must match the pattern.
    EachMatches {
        regex: Regex,
        description: &'static str,
    },
}

impl Validator {
    #[must_use]
    pub fn one_of(values: &'static [&'static str]) -> Self {
        Validator::OneOf(values)
    }

    /// Compiles a pattern known at build time.
    ///
    /// # Panics
    /// Panics if `pattern` is not a valid regular expression.
    #[must_use]
    #[allow(clippy::expect_used)] // static patterns, covered by the schema tests
    pub fn matches(pattern: &'static str, description: &'static str) -> Self {
        Validator::Matches {
            regex: Regex::new(pattern).expect("static regex should not panic"),
            description,
        }
    }

    /// # Panics
    /// Panics if `pattern` is not a valid regular expression.
    #[must_use]
    #[allow(clippy::expect_used)] // static patterns, covered by the schema tests
    pub fn each_matches(pattern: &'static str, description: &'static str) -> Self {
        Validator::EachMatches {
            regex: Regex::new(pattern).expect("static regex should not panic"),
            description,
        }
    }

    #[must_use]
    pub fn non_empty() -> Self {
        Validator::Length { min: 1, max: None }
    }

    /// Runs the rule against `value`, appending failures to `diags`.
    ///
    /// `sensitive` hides the offending value in the message.
    pub fn check(&self, path: &AttrPath, value: &Value, sensitive: bool, diags: &mut Diagnostics) {
        if !value.is_known() {
            return;
        }
        let shown = |v: &Value| {
            if sensitive {
                "(sensitive value)".to_owned()
            } else {
                v.to_string()
            }
        };
        match self {
            Validator::OneOf(allowed) => {
                if let Ok(s) = value.as_str()
                    && !allowed.contains(&s)
                {
                    diags.attribute_error(
                        path.clone(),
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {path} value must be one of: {}, got: {}",
                            quoted_list(allowed),
                            shown(value)
                        ),
                    );
                }
            }
            Validator::Matches { regex, description } => {
                if let Ok(s) = value.as_str()
                    && !regex.is_match(s)
                {
                    diags.attribute_error(
                        path.clone(),
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {path} {description}, got: {}",
                            shown(value)
                        ),
                    );
                }
            }
            Validator::Length { min, max } => {
                if let Ok(s) = value.as_str() {
                    let len = s.chars().count();
                    let too_long = max.is_some_and(|m| len > m);
                    if len < *min || too_long {
                        let bound = max.map_or_else(
                            || format!("at least {min}"),
                            |m| format!("between {min} and {m}"),
                        );
                        diags.attribute_error(
                            path.clone(),
                            "Invalid Attribute Value Length",
                            format!(
                                "Attribute {path} string length must be {bound}, got: {len}"
                            ),
                        );
                    }
                }
            }
            Validator::Between { min, max } => {
                if let Ok(i) = value.as_i64()
                    && (i < *min || i > *max)
                {
                    diags.attribute_error(
                        path.clone(),
                        "Invalid Attribute Value",
                        format!("Attribute {path} value must be between {min} and {max}, got: {i}"),
                    );
                }
            }
            Validator::SizeAtLeast(min) => {
                if let Ok(items) = value.as_elements()
                    && items.len() < *min
                {
                    diags.attribute_error(
                        path.clone(),
                        "Invalid Attribute Value",
                        format!(
                            "Attribute {path} must contain at least {min} elements, got: {}",
                            items.len()
                        ),
                    );
                }
            }
            Validator::EachOneOf(allowed) => {
                for (i, item) in value.as_elements().unwrap_or_default().iter().enumerate() {
                    Validator::OneOf(allowed).check(&path.index(i), item, sensitive, diags);
                }
            }
            Validator::EachMatches { regex, description } => {
                for (i, item) in value.as_elements().unwrap_or_default().iter().enumerate() {
                    Validator::Matches {
                        regex: regex.clone(),
                        description,
                    }
                    .check(&path.index(i), item, sensitive, diags);
                }
            }
        }
    }
}

fn quoted_list(values: &[&str]) -> String {
    let inner: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
    format!("[{}]", inner.join(" "))
}
