//! Cross-field rules of `cidaas_app`.

use std::collections::BTreeSet;

use provider_kit::{is_empty_sentinel, AttrPath, Diagnostics, ObjectValue, Value};

use super::schema::COMMON_CONFIGS;

const COMPANY_FIELDS: &[&str] = &["company_name", "company_address", "company_website"];
const GROUP_LISTS: &[&str] = &["allowed_groups", "operations_allowed_groups", "allow_guest_login_groups"];

pub fn check(config: &ObjectValue, diags: &mut Diagnostics) {
    company_details(config, diags);
    subset(config, "default_roles", "allowed_roles", diags);
    subset(config, "default_scopes", "allowed_scopes", diags);
    for list in GROUP_LISTS {
        group_entries(config, list, diags);
    }
    mfa_interval(config, diags);
    requires(config, "enable_bot_detection", "bot_provider", diags);
    requires(config, "enable_login_spi", "login_spi", diags);
    requires(config, "is_group_login_selection_enabled", "group_selection", diags);
}

fn company_details(config: &ObjectValue, diags: &mut Diagnostics) {
    let common = config.get(COMMON_CONFIGS).as_object().ok();
    for field in COMPANY_FIELDS {
        let top = config.get(field);
        let shared = common.map_or(&Value::Null, |c| c.get(field));
        if top.is_null() && shared.is_null() {
            diags.attribute_error(
                AttrPath::root(*field),
                "Missing required argument",
                format!("\"{field}\" must be set on the app or in {COMMON_CONFIGS}"),
            );
        }
    }
}

fn strings(value: &Value) -> Option<BTreeSet<&str>> {
    if !value.is_known() || value.contains_unknown() {
        return None;
    }
    let items = value.as_elements().ok()?;
    Some(items.iter().filter_map(Value::str_opt).collect())
}

fn subset_at(path: AttrPath, sub: &Value, sup: &Value, sup_name: &str, diags: &mut Diagnostics) {
    let (Some(sub), Some(sup)) = (strings(sub), strings(sup)) else {
        return;
    };
    let missing: Vec<&str> = sub.difference(&sup).copied().collect();
    if !missing.is_empty() {
        diags.attribute_error(
            path,
            "Invalid Attribute Combination",
            format!("values [{}] are not listed in {sup_name}", missing.join(", ")),
        );
    }
}

fn subset(config: &ObjectValue, sub: &str, sup: &str, diags: &mut Diagnostics) {
    subset_at(AttrPath::root(sub), config.get(sub), config.get(sup), sup, diags);
}

fn group_entries(config: &ObjectValue, list: &str, diags: &mut Diagnostics) {
    let value = config.get(list);
    if is_empty_sentinel(value) {
        return;
    }
    let Ok(items) = value.as_elements() else {
        return;
    };
    let mut seen = BTreeSet::new();
    for (i, item) in items.iter().enumerate() {
        let Ok(entry) = item.as_object() else {
            continue;
        };
        let path = AttrPath::root(list).index(i);
        match entry.get("group_id") {
            Value::Null => diags.attribute_error(
                path.attr("group_id"),
                "Missing required argument",
                "every group entry needs a group_id",
            ),
            Value::String(id) if !seen.insert(id.as_str()) => diags.attribute_error(
                path.attr("group_id"),
                "Duplicate group",
                format!("group '{id}' is listed more than once in {list}"),
            ),
            _ => {}
        }
        subset_at(
            path.attr("default_roles"),
            entry.get("default_roles"),
            entry.get("roles"),
            "roles",
            diags,
        );
    }
}

fn mfa_interval(config: &ObjectValue, diags: &mut Diagnostics) {
    let Ok(mfa) = config.get("mfa").as_object() else {
        return;
    };
    let time_based = matches!(mfa.str_of("setting"), Some("TIME_BASED" | "SMART_PLUS_TIME_BASED"));
    if time_based && mfa.get("time_interval_in_seconds").is_null() {
        diags.attribute_error(
            AttrPath::root("mfa").attr("time_interval_in_seconds"),
            "Missing required argument",
            "time_interval_in_seconds is required when mfa.setting is time based",
        );
    }
}

fn requires(config: &ObjectValue, switch: &str, needed: &str, diags: &mut Diagnostics) {
    if config.bool_of(switch) == Some(true) && config.get(needed).is_null() {
        diags.attribute_error(
            AttrPath::root(needed),
            "Missing required argument",
            format!("{needed} is required when {switch} is true"),
        );
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn base() -> ObjectValue {
        ObjectValue::new()
            .with("client_type", "SINGLE_PAGE")
            .with("client_name", "Portal")
            .with("company_name", "Acme")
            .with("company_address", "Main St 1")
            .with("company_website", "https://acme.example")
    }

    fn run(config: &ObjectValue) -> Diagnostics {
        let mut diags = Diagnostics::new();
        check(config, &mut diags);
        diags
    }

    fn leaf_paths(diags: &Diagnostics) -> Vec<String> {
        diags.errors().filter_map(|d| d.path.as_ref().map(ToString::to_string)).collect()
    }

    #[test]
    fn complete_config_passes() {
        assert!(run(&base()).is_empty());
    }

    #[test]
    fn company_details_may_come_from_common_configs() {
        let mut config = base();
        config.remove("company_name");
        assert_eq!(leaf_paths(&run(&config)), ["company_name"]);

        let common = ObjectValue::new().with("company_name", "Acme");
        config.set(COMMON_CONFIGS, Value::Object(common));
        assert!(run(&config).is_empty());
    }

    #[test]
    fn default_roles_must_be_allowed() {
        let config = base()
            .with("allowed_roles", Value::string_set(["user"]))
            .with("default_roles", Value::string_set(["user", "admin"]));
        let diags = run(&config);
        assert_eq!(leaf_paths(&diags), ["default_roles"]);
        assert!(diags.errors().next().unwrap().detail.contains("admin"));

        let unknown = base()
            .with("allowed_roles", Value::Unknown)
            .with("default_roles", Value::string_set(["admin"]));
        assert!(run(&unknown).is_empty());
    }

    #[test]
    fn group_entries_are_checked() {
        let entry = |id: &str, roles: &[&str], defaults: &[&str]| {
            Value::Object(
                ObjectValue::new()
                    .with("group_id", id)
                    .with("roles", Value::string_set(roles.iter().copied()))
                    .with("default_roles", Value::string_set(defaults.iter().copied())),
            )
        };
        let config = base().with(
            "allowed_groups",
            Value::list([entry("g1", &["a"], &["a"]), entry("g1", &["a"], &["b"])]),
        );
        assert_eq!(
            leaf_paths(&run(&config)),
            ["allowed_groups[1].group_id", "allowed_groups[1].default_roles"]
        );
    }

    #[test]
    fn explicit_empty_group_list_is_accepted() {
        let sentinel = Value::list([Value::Object(
            ObjectValue::new()
                .with("group_id", Value::Null)
                .with("roles", Value::Null)
                .with("default_roles", Value::Null),
        )]);
        assert!(run(&base().with("allowed_groups", sentinel)).is_empty());
    }

    #[test]
    fn time_based_mfa_needs_an_interval() {
        let mfa = ObjectValue::new().with("setting", "TIME_BASED");
        let config = base().with("mfa", mfa.clone());
        assert_eq!(leaf_paths(&run(&config)), ["mfa.time_interval_in_seconds"]);

        let config = base().with("mfa", mfa.with("time_interval_in_seconds", 300_i64));
        assert!(run(&config).is_empty());
    }

    #[test]
    fn switches_require_their_settings() {
        let config = base().with("enable_bot_detection", true).with("enable_login_spi", true);
        assert_eq!(leaf_paths(&run(&config)), ["bot_provider", "login_spi"]);
        let config = base().with("enable_bot_detection", false);
        assert!(run(&config).is_empty());
    }
}
