//! Resource kinds managed by the provider.

pub mod app;
pub mod consent;
pub mod consent_group;
pub mod consent_version;
pub mod custom_provider;
pub mod group_type;
pub mod hosted_page;
pub mod password_policy;
pub mod registration_field;
pub mod role;
pub mod scope;
pub mod scope_group;
pub mod social_provider;
pub mod template;
pub mod template_group;
pub mod user_group;
pub mod webhook;

use provider_kit::{ObjectValue, Value};

use crate::locale::language_for_locale;

/// Sets `language` from `locale` when only the locale is given.
pub fn fill_entry_language(entry: &mut ObjectValue) {
    if !entry.get("language").is_null() {
        return;
    }
    if let Some(locale) = entry.str_of("locale") {
        let language = language_for_locale(locale);
        entry.set("language", Value::from(language));
    }
}

/// [`fill_entry_language`] for every object in the list or set `attr`.
pub fn fill_language(plan: &mut ObjectValue, attr: &str) {
    let fill = |items: &[Value]| -> Vec<Value> {
        items
            .iter()
            .map(|item| match item {
                Value::Object(entry) => {
                    let mut entry = entry.clone();
                    fill_entry_language(&mut entry);
                    Value::Object(entry)
                }
                other => other.clone(),
            })
            .collect()
    };
    let filled = match plan.get(attr) {
        Value::List(items) => Value::List(fill(items)),
        Value::Set(items) => Value::set(fill(items)),
        _ => return,
    };
    plan.set(attr, filled);
}
