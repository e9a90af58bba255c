//! Attribute table of `cidaas_app`.
//!
//! Wire names are snake case except where the client API uses camel case.
//! Almost everything is optional and computed: the backend fills omitted
//! settings, so the create payload carries exactly what the operator wrote.

use std::sync::LazyLock;

use provider_kit::{Attribute, DriftPolicy, Schema, Validator, WireCase};

pub const TYPE_NAME: &str = "cidaas_app";

/// State-only object holding tenant-wide fallbacks.
pub const COMMON_CONFIGS: &str = "common_configs";

pub const CLIENT_TYPES: &[&str] = &[
    "SINGLE_PAGE",
    "REGULAR_WEB",
    "NON_INTERACTIVE",
    "IOS",
    "ANDROID",
    "WINDOWS_MOBILE",
    "DESKTOP",
    "MOBILE",
    "DEVICE",
    "THIRD_PARTY",
];

pub const MFA_SETTINGS: &[&str] = &["OFF", "ALWAYS", "SMART", "TIME_BASED", "SMART_PLUS_TIME_BASED"];

const ALIGNMENTS: &[&str] = &["CENTER", "LEFT", "RIGHT"];
const HEX_COLOR: &str = "^#(?:[0-9a-fA-F]{3}){1,2}$";
const HEX_COLOR_HINT: &str = "must be a valid hex color code, e.g. #ef4923";
const HTTP_URL: &str = "^https?://";

/// Settings the backend may rewrite and the sets it leaves out when empty.
pub const DRIFT: DriftPolicy = DriftPolicy {
    watched: &[
        "client_type",
        "hosted_page_group",
        "template_group_id",
        "response_types",
        "grant_types",
        "token_endpoint_auth_method",
        "subject_type",
    ],
    empty_sets: &[
        "redirect_uris",
        "allowed_scopes",
        "allowed_logout_urls",
        "login_providers",
        "allowed_web_origins",
        "allowed_origins",
        "allowed_mfa",
        "allowed_roles",
        "default_roles",
        "default_scopes",
        "pending_scopes",
    ],
};

/// Top-level attributes that `common_configs` may provide.
const COMMON_FIELDS: &[&str] = &[
    "company_name",
    "company_address",
    "company_website",
    "allowed_scopes",
    "redirect_uris",
    "allowed_logout_urls",
    "allowed_web_origins",
    "allowed_origins",
    "login_providers",
    "default_scopes",
    "pending_scopes",
    "allowed_mfa",
    "allowed_roles",
    "default_roles",
    "response_types",
    "grant_types",
    "hosted_page_group",
    "template_group_id",
    "enable_deduplication",
    "auto_login_after_register",
    "enable_passwordless_auth",
    "register_with_login_information",
    "allow_disposable_email",
    "validate_phone_number",
    "fds_enabled",
    "is_hybrid_app",
    "enable_classical_provider",
    "is_remember_me_selected",
    "email_verification_required",
    "always_ask_mfa",
    "mfa",
    "token_lifetime_in_seconds",
    "id_token_lifetime_in_seconds",
    "refresh_token_lifetime_in_seconds",
    "allowed_groups",
    "operations_allowed_groups",
    "social_providers",
    "custom_providers",
    "saml_providers",
    "ad_providers",
];

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let mut attributes = Vec::new();
    attributes.extend(identity());
    attributes.extend(branding());
    attributes.extend(switches());
    attributes.extend(oauth());
    attributes.extend(providers());
    attributes.extend(groups());
    attributes.extend(security());
    attributes.extend(oidc());
    attributes.extend(extras());
    let common = common_configs(&attributes);
    attributes.push(common);
    Schema::new(TYPE_NAME, WireCase::Snake, attributes)
});

fn identity() -> Vec<Attribute> {
    vec![
        Attribute::string("id").read_only().state_only(),
        Attribute::string("client_id").computed().identifier(),
        Attribute::string("client_secret").computed().sensitive(),
        Attribute::string("client_type")
            .required()
            .validate(Validator::one_of(CLIENT_TYPES)),
        Attribute::string("client_name").required().validate(Validator::non_empty()),
        Attribute::string("client_display_name"),
        Attribute::string("company_name").computed(),
        Attribute::string("company_address").computed(),
        Attribute::string("company_website")
            .computed()
            .validate(Validator::matches(HTTP_URL, "must be an http(s) URL")),
        Attribute::string("app_owner").computed(),
        Attribute::string("description"),
        Attribute::bool("editable").computed(),
        Attribute::bool("enabled").computed(),
        Attribute::map("application_meta_data"),
        Attribute::timestamp("created_at").read_only().wire("createdTime"),
        Attribute::timestamp("updated_at").read_only().wire("updatedTime"),
    ]
}

fn branding() -> Vec<Attribute> {
    vec![
        Attribute::string("accent_color")
            .computed()
            .wire("accentColor")
            .validate(Validator::matches(HEX_COLOR, HEX_COLOR_HINT)),
        Attribute::string("primary_color")
            .computed()
            .wire("primaryColor")
            .validate(Validator::matches(HEX_COLOR, HEX_COLOR_HINT)),
        Attribute::string("media_type")
            .computed()
            .wire("mediaType")
            .validate(Validator::one_of(&["IMAGE", "VIDEO"])),
        Attribute::string("content_align")
            .computed()
            .wire("contentAlign")
            .validate(Validator::one_of(ALIGNMENTS)),
        Attribute::string("logo_align")
            .computed()
            .wire("logoAlign")
            .validate(Validator::one_of(ALIGNMENTS)),
        Attribute::string("logo_uri"),
        Attribute::string("background_uri"),
        Attribute::string("video_url"),
        Attribute::string("policy_uri"),
        Attribute::string("tos_uri"),
        Attribute::string("imprint_uri"),
        Attribute::string("client_uri"),
        Attribute::string("hosted_page_group").computed(),
        Attribute::string("template_group_id").computed(),
        Attribute::string("consent_page_group"),
        Attribute::string("password_policy_ref"),
    ]
}

fn switches() -> Vec<Attribute> {
    [
        "enable_deduplication",
        "auto_login_after_register",
        "enable_passwordless_auth",
        "register_with_login_information",
        "allow_disposable_email",
        "validate_phone_number",
        "fds_enabled",
        "is_hybrid_app",
        "jwe_enabled",
        "user_consent",
        "always_ask_mfa",
        "email_verification_required",
        "enable_classical_provider",
        "is_remember_me_selected",
        "enable_bot_detection",
        "is_login_success_page_enabled",
        "is_register_success_page_enabled",
        "is_group_login_selection_enabled",
        "mobile_number_verification_required",
        "accept_roles_in_the_registration",
        "enable_login_spi",
        "require_auth_time",
        "allow_guest_login",
        "backchannel_logout_session_required",
    ]
    .into_iter()
    .map(|name| Attribute::bool(name).computed())
    .collect()
}

fn oauth() -> Vec<Attribute> {
    vec![
        Attribute::string_set("allow_login_with")
            .computed()
            .wire("allowLoginWith")
            .validate(Validator::EachOneOf(&["EMAIL", "MOBILE", "USER_NAME"])),
        Attribute::string_set("redirect_uris")
            .computed()
            .validate(Validator::each_matches(HTTP_URL, "must be an http(s) URL")),
        Attribute::string_set("allowed_logout_urls").computed(),
        Attribute::string_set("allowed_scopes").computed(),
        Attribute::string_set("default_scopes").computed(),
        Attribute::string_set("pending_scopes").computed(),
        Attribute::string_set("response_types").computed(),
        Attribute::string_set("grant_types").computed(),
        Attribute::string_set("login_providers").computed(),
        Attribute::string_set("additional_access_token_payload").computed(),
        Attribute::string_set("required_fields").computed(),
        Attribute::string_set("allowed_web_origins").computed(),
        Attribute::string_set("allowed_origins").computed(),
        Attribute::string_set("web_message_uris"),
        Attribute::string_set("contacts"),
        Attribute::string_set("default_acr_values"),
        Attribute::int64("default_max_age")
            .computed()
            .validate(Validator::Between { min: 0, max: i64::from(i32::MAX) }),
        Attribute::int64("token_lifetime_in_seconds")
            .computed()
            .validate(Validator::Between { min: 1, max: i64::from(i32::MAX) }),
        Attribute::int64("id_token_lifetime_in_seconds")
            .computed()
            .validate(Validator::Between { min: 1, max: i64::from(i32::MAX) }),
        Attribute::int64("refresh_token_lifetime_in_seconds")
            .computed()
            .validate(Validator::Between { min: 1, max: i64::from(i32::MAX) }),
        Attribute::string("token_endpoint_auth_method").computed().validate(Validator::one_of(&[
            "client_secret_basic",
            "client_secret_post",
            "client_secret_jwt",
            "private_key_jwt",
            "none",
        ])),
        Attribute::string("token_endpoint_auth_signing_alg"),
        Attribute::object(
            "mobile_settings",
            vec![
                Attribute::string("team_id").wire("teamId"),
                Attribute::string("bundle_id").wire("bundleId"),
                Attribute::string("package_name").wire("packageName"),
                Attribute::string("key_hash").wire("keyHash"),
            ],
        )
        .computed(),
    ]
}

fn provider_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("provider_name"),
        Attribute::string("display_name"),
        Attribute::string("logo_url"),
        Attribute::string("type"),
        Attribute::bool("is_provider_visible"),
        Attribute::string_set("domains"),
    ]
}

fn providers() -> Vec<Attribute> {
    vec![
        Attribute::object_list(
            "social_providers",
            vec![
                Attribute::string("provider_name"),
                Attribute::string("social_id"),
                Attribute::string("display_name"),
            ],
        )
        .wire("socialProviders")
        .empty_sentinel(),
        Attribute::object_list("custom_providers", provider_fields()).empty_sentinel(),
        Attribute::object_list("saml_providers", provider_fields()).empty_sentinel(),
        Attribute::object_list("ad_providers", provider_fields()).empty_sentinel(),
    ]
}

fn group_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("group_id"),
        Attribute::string_set("roles"),
        Attribute::string_set("default_roles"),
    ]
}

fn groups() -> Vec<Attribute> {
    vec![
        Attribute::object_list("allowed_groups", group_fields()).empty_sentinel(),
        Attribute::object_list("operations_allowed_groups", group_fields()).empty_sentinel(),
        Attribute::object_list("allow_guest_login_groups", group_fields()).empty_sentinel(),
        Attribute::string_set("group_ids").wire("groupIds"),
        Attribute::string_set("group_types"),
        Attribute::object(
            "group_selection",
            vec![
                Attribute::bool("always_show_group_selection").wire("alwaysShowGroupSelection"),
                Attribute::string_set("selectable_groups").wire("selectableGroups"),
                Attribute::string_set("selectable_group_types").wire("selectableGroupTypes"),
            ],
        ),
        Attribute::object(
            "group_role_restriction",
            vec![
                Attribute::string("match_condition")
                    .required()
                    .validate(Validator::one_of(&["and", "or"])),
                Attribute::object_list(
                    "filters",
                    vec![
                        Attribute::string("group_id").required(),
                        Attribute::object(
                            "role_filter",
                            vec![
                                Attribute::string("match_condition").validate(Validator::one_of(&["and", "or"])),
                                Attribute::string_set("roles"),
                            ],
                        ),
                    ],
                ),
            ],
        ),
        Attribute::string_set("allowed_roles").computed(),
        Attribute::string_set("default_roles").computed(),
    ]
}

fn security() -> Vec<Attribute> {
    vec![
        Attribute::string_set("allowed_mfa").computed(),
        Attribute::object(
            "mfa",
            vec![
                Attribute::string("setting")
                    .default("OFF")
                    .validate(Validator::one_of(MFA_SETTINGS)),
                Attribute::int64("time_interval_in_seconds").validate(Validator::Between {
                    min: 1,
                    max: i64::from(i32::MAX),
                }),
                Attribute::string_set("allowed_methods"),
            ],
        )
        .computed(),
        Attribute::string_set("suggest_mfa"),
        Attribute::string("bot_provider").validate(Validator::one_of(&["CIDAAS", "GOOGLE"])),
        Attribute::string("bot_captcha_ref"),
        Attribute::string("captcha_ref"),
        Attribute::string_set("captcha_refs"),
        Attribute::string_set("consent_refs"),
        Attribute::string("communication_medium_verification"),
        Attribute::object(
            "suggest_verification_methods",
            vec![
                Attribute::object(
                    "mandatory_config",
                    vec![
                        Attribute::string_set("methods"),
                        Attribute::string("range").validate(Validator::one_of(&["ALLOF", "ONEOF"])),
                        Attribute::int32("skip_until"),
                    ],
                ),
                Attribute::object("optional_config", vec![Attribute::string_set("methods")]),
                Attribute::int32("skip_duration_in_days"),
            ],
        ),
    ]
}

fn oidc() -> Vec<Attribute> {
    let mut out = vec![
        Attribute::string("jwks_uri"),
        Attribute::string("jwks"),
        Attribute::string("sector_identifier_uri"),
        Attribute::string("subject_type")
            .computed()
            .validate(Validator::one_of(&["public", "pairwise"])),
        Attribute::string("initiate_login_uri"),
        Attribute::string("registration_client_uri"),
        Attribute::string_set("request_uris"),
        Attribute::string("backchannel_logout_uri"),
        Attribute::string_set("post_logout_redirect_uris"),
        Attribute::string("webfinger"),
    ];
    out.extend(
        [
            "id_token_signed_response_alg",
            "id_token_encrypted_response_alg",
            "id_token_encrypted_response_enc",
            "userinfo_signed_response_alg",
            "userinfo_encrypted_response_alg",
            "userinfo_encrypted_response_enc",
            "request_object_signing_alg",
            "request_object_encryption_alg",
            "request_object_encryption_enc",
        ]
        .into_iter()
        .map(Attribute::string),
    );
    out
}

fn extras() -> Vec<Attribute> {
    vec![Attribute::object(
        "login_spi",
        vec![
            Attribute::string("oauth_client_id"),
            Attribute::string("spi_url").validate(Validator::matches(HTTP_URL, "must be an http(s) URL")),
        ],
    )]
}

/// `common_configs` mirrors the shareable top-level attributes, all optional.
fn common_configs(top_level: &[Attribute]) -> Attribute {
    let fields = top_level
        .iter()
        .filter(|a| COMMON_FIELDS.contains(&a.name()))
        .map(|a| a.clone().optional())
        .collect();
    Attribute::object(COMMON_CONFIGS, fields).state_only()
}
