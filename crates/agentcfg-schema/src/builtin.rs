//! The device agent's configuration table.
//!
//! Scalar rules are created once and referenced by name. Composite bundles
//! (provisioning, extended environment and fetch options) build their fields
//! from the *same* rule handles as the scalar keys they mirror, so a change
//! to a scalar's coercion reaches every bundle that carries it.

use crate::descriptor::{DefaultPolicy, KeyDescriptor, KeySource};
use agentcfg_validate::Rule;
use serde_json::{json, Value};

/// Public delta server.
pub const DEFAULT_DELTA_ENDPOINT: &str = "https://delta.balena-cloud.com";

/// Analytics token baked in at build time; empty when not provided.
pub const DEFAULT_MIXPANEL_TOKEN: &str = match option_env!("DEFAULT_MIXPANEL_TOKEN") {
    Some(token) => token,
    None => "",
};

fn fixed(name: &str, rule: &Rule, default: Value, source: KeySource) -> KeyDescriptor {
    KeyDescriptor::new(name, rule.clone(), DefaultPolicy::Static(default), source)
}

fn optional(name: &str, rule: &Rule, source: KeySource) -> KeyDescriptor {
    KeyDescriptor::new(name, rule.clone(), DefaultPolicy::NoDefault, source)
}

fn computed(name: &str, rule: &Rule) -> KeyDescriptor {
    KeyDescriptor::new(
        name,
        rule.clone(),
        DefaultPolicy::ComputedOnly,
        KeySource::Function,
    )
}

pub(crate) fn descriptors() -> Vec<KeyDescriptor> {
    use KeySource::{Database, Environment};

    // Config file / environment
    let api_endpoint = Rule::string();
    let api_timeout = Rule::permissive_number();
    let listen_port = Rule::permissive_number();
    let delta_endpoint = Rule::string();
    let uuid = Rule::string();
    let api_key = Rule::string();
    let device_api_key = Rule::string();
    let device_type = Rule::string();
    let username = Rule::string();
    let user_id = Rule::permissive_number();
    let device_id = Rule::permissive_number();
    let registered_at = Rule::permissive_number();
    let application_id = Rule::permissive_number();
    let app_update_poll_interval = Rule::permissive_number();
    let mixpanel_token = Rule::string();
    let bootstrap_retry_delay = Rule::permissive_number();
    let hostname = Rule::string();
    let persistent_logging = Rule::permissive_boolean();

    // Database
    let api_secret = Rule::string();
    let name = Rule::string();
    let initial_config_reported = Rule::string();
    let initial_config_saved = Rule::permissive_boolean();
    let containers_normalised = Rule::permissive_boolean();
    let logging_enabled = Rule::permissive_boolean();
    let connectivity_check_enabled = Rule::permissive_boolean();
    let delta = Rule::permissive_boolean();
    let delta_request_timeout = Rule::permissive_number();
    let delta_apply_timeout = Rule::permissive_number();
    let delta_retry_count = Rule::permissive_number();
    let delta_retry_interval = Rule::permissive_number();
    let delta_version = Rule::permissive_number();
    let lock_override = Rule::permissive_boolean();
    let legacy_apps_present = Rule::permissive_boolean();
    let pin_device = Rule::embedded(Rule::structure([
        ("app", Rule::number()),
        ("commit", Rule::string()),
    ]));
    let current_commit = Rule::string();
    let target_state_set = Rule::permissive_boolean();
    let local_mode = Rule::permissive_boolean();

    // Computed
    let version = Rule::string();
    let current_api_key = Rule::string();
    let provisioned = Rule::boolean();
    let os_version = Rule::nullable(&Rule::string());
    let os_variant = Rule::nullable(&Rule::string());
    let provisioning_options = Rule::structure([
        ("uuid", Rule::nullable(&uuid)),
        ("applicationId", Rule::nullable(&application_id)),
        ("userId", Rule::nullable(&user_id)),
        ("deviceType", device_type.clone()),
        ("provisioningApiKey", Rule::nullable(&api_key)),
        ("deviceApiKey", device_api_key.clone()),
        ("apiEndpoint", api_endpoint.clone()),
        ("apiTimeout", api_timeout.clone()),
        ("registered_at", Rule::nullable(&registered_at)),
        ("deviceId", Rule::nullable(&device_id)),
    ]);
    let mixpanel_host = Rule::union([
        Rule::null(),
        Rule::structure([("host", Rule::string()), ("path", Rule::string())]),
    ]);
    let extended_env_options = Rule::structure([
        ("uuid", Rule::nullable(&uuid)),
        ("listenPort", listen_port.clone()),
        ("name", name.clone()),
        ("apiSecret", Rule::nullable(&api_secret)),
        ("deviceApiKey", device_api_key.clone()),
        ("version", version.clone()),
        ("deviceType", device_type.clone()),
        ("osVersion", os_version.clone()),
    ]);
    let fetch_options = Rule::structure([
        ("uuid", Rule::nullable(&uuid)),
        ("currentApiKey", current_api_key.clone()),
        ("apiEndpoint", api_endpoint.clone()),
        ("deltaEndpoint", delta_endpoint.clone()),
        ("delta", delta.clone()),
        ("deltaRequestTimeout", delta_request_timeout.clone()),
        ("deltaApplyTimeout", Rule::nullable(&delta_apply_timeout)),
        ("deltaRetryCount", delta_retry_count.clone()),
        ("deltaRetryInterval", delta_retry_interval.clone()),
        ("deltaVersion", delta_version.clone()),
    ]);
    let unmanaged = Rule::boolean();

    vec![
        fixed("apiEndpoint", &api_endpoint, json!(""), Environment),
        fixed("apiTimeout", &api_timeout, json!(15 * 60 * 1000), Environment),
        fixed("listenPort", &listen_port, json!(48484), Environment),
        fixed(
            "deltaEndpoint",
            &delta_endpoint,
            json!(DEFAULT_DELTA_ENDPOINT),
            Environment,
        ),
        optional("uuid", &uuid, Environment),
        optional("apiKey", &api_key, Environment),
        fixed("deviceApiKey", &device_api_key, json!(""), Environment),
        fixed("deviceType", &device_type, json!("unknown"), Environment),
        optional("username", &username, Environment),
        optional("userId", &user_id, Environment),
        optional("deviceId", &device_id, Environment),
        optional("registered_at", &registered_at, Environment),
        optional("applicationId", &application_id, Environment),
        fixed(
            "appUpdatePollInterval",
            &app_update_poll_interval,
            json!(60000),
            Environment,
        ),
        fixed(
            "mixpanelToken",
            &mixpanel_token,
            json!(DEFAULT_MIXPANEL_TOKEN),
            Environment,
        ),
        fixed(
            "bootstrapRetryDelay",
            &bootstrap_retry_delay,
            json!(30000),
            Environment,
        ),
        optional("hostname", &hostname, Environment),
        fixed(
            "persistentLogging",
            &persistent_logging,
            json!(false),
            Environment,
        ),
        optional("apiSecret", &api_secret, Database),
        fixed("name", &name, json!("local"), Database),
        fixed(
            "initialConfigReported",
            &initial_config_reported,
            json!(""),
            Database,
        ),
        fixed(
            "initialConfigSaved",
            &initial_config_saved,
            json!(false),
            Database,
        ),
        fixed(
            "containersNormalised",
            &containers_normalised,
            json!(false),
            Database,
        ),
        fixed("loggingEnabled", &logging_enabled, json!(true), Database),
        fixed(
            "connectivityCheckEnabled",
            &connectivity_check_enabled,
            json!(true),
            Database,
        ),
        fixed("delta", &delta, json!(false), Database),
        fixed(
            "deltaRequestTimeout",
            &delta_request_timeout,
            json!(30000),
            Database,
        ),
        optional("deltaApplyTimeout", &delta_apply_timeout, Database),
        fixed("deltaRetryCount", &delta_retry_count, json!(30), Database),
        fixed(
            "deltaRetryInterval",
            &delta_retry_interval,
            json!(10000),
            Database,
        ),
        fixed("deltaVersion", &delta_version, json!(2), Database),
        fixed("lockOverride", &lock_override, json!(false), Database),
        fixed(
            "legacyAppsPresent",
            &legacy_apps_present,
            json!(false),
            Database,
        ),
        optional("pinDevice", &pin_device, Database),
        optional("currentCommit", &current_commit, Database),
        fixed("targetStateSet", &target_state_set, json!(false), Database),
        fixed("localMode", &local_mode, json!(false), Database),
        computed("version", &version),
        computed("currentApiKey", &current_api_key),
        computed("provisioned", &provisioned),
        computed("osVersion", &os_version),
        computed("osVariant", &os_variant),
        computed("provisioningOptions", &provisioning_options),
        computed("mixpanelHost", &mixpanel_host),
        computed("extendedEnvOptions", &extended_env_options),
        computed("fetchOptions", &fetch_options),
        computed("unmanaged", &unmanaged),
    ]
}
