//! # Built-in Registry Resolution Tests
//!
//! End-to-end checks of the device agent's configuration table.
//!
//! | Property | Test |
//! |----------|------|
//! | static defaults resolve exactly | `test_static_defaults_resolve_exactly` |
//! | no-default keys resolve to null | `test_no_default_keys_resolve_to_null` |
//! | computed keys never default | `test_computed_keys_never_default` |
//! | listenPort / lockOverride scenarios | `test_scenario_*` |
//! | pinDevice document handling | `test_pin_device_*` |
//! | bundles share scalar rules | `test_bundles_share_scalar_rules` |

use agentcfg_schema::{
    keys, schema, ConfigError, DefaultPolicy, ErrorKind, KeySource, Origin, PolicyKind,
    ValueKind,
};
use agentcfg_validate::{Rule, Validator};
use proptest::prelude::*;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn field_rule<'a>(bundle: &'a Rule, name: &str) -> &'a Rule {
    match bundle.validator() {
        Validator::Structure(fields) => {
            &fields
                .iter()
                .find(|field| field.name == name)
                .unwrap_or_else(|| panic!("bundle has no field {name}"))
                .rule
        }
        other => panic!("not a structure: {other:?}"),
    }
}

/// The non-null member of a `T | null` union, or the rule itself.
fn strip_nullable(rule: &Rule) -> &Rule {
    match rule.validator() {
        Validator::Union(members) => members
            .iter()
            .find(|member| !matches!(member.validator(), Validator::Null))
            .expect("nullable union has a non-null member"),
        _ => rule,
    }
}

fn assert_shares_rule(bundle_key: &str, field: &str, scalar_key: &str) {
    let registry = schema();
    let bundle = registry.lookup(bundle_key).unwrap().rule();
    let scalar = registry.lookup(scalar_key).unwrap().rule();
    assert!(
        Rule::same(strip_nullable(field_rule(bundle, field)), scalar),
        "{bundle_key}.{field} does not share the rule of {scalar_key}"
    );
}

// =============================================================================
// Default Policies
// =============================================================================

#[test]
fn test_static_defaults_resolve_exactly() {
    let registry = schema();
    let mut checked = 0;
    for descriptor in registry.descriptors() {
        if let DefaultPolicy::Static(expected) = descriptor.default_policy() {
            let resolved = registry.resolve(descriptor.name(), None).unwrap();
            assert_eq!(&resolved.value, expected, "{}", descriptor.name());
            assert_eq!(resolved.origin, Origin::Default);
            checked += 1;
        }
    }
    assert_eq!(checked, 25);
}

#[test]
fn test_documented_defaults() {
    let registry = schema();
    let expected = [
        ("apiEndpoint", json!("")),
        ("apiTimeout", json!(900000)),
        ("listenPort", json!(48484)),
        ("deltaEndpoint", json!("https://delta.balena-cloud.com")),
        ("deviceType", json!("unknown")),
        ("appUpdatePollInterval", json!(60000)),
        ("bootstrapRetryDelay", json!(30000)),
        ("name", json!("local")),
        ("persistentLogging", json!(false)),
        ("legacyAppsPresent", json!(false)),
        ("lockOverride", json!(false)),
        ("loggingEnabled", json!(true)),
        ("connectivityCheckEnabled", json!(true)),
        ("deltaRequestTimeout", json!(30000)),
        ("deltaRetryCount", json!(30)),
        ("deltaRetryInterval", json!(10000)),
        ("deltaVersion", json!(2)),
    ];
    for (key, value) in expected {
        assert_eq!(registry.default_for(key).unwrap(), value, "{key}");
    }
}

#[test]
fn test_no_default_keys_resolve_to_null() {
    let registry = schema();
    let no_default: Vec<_> = registry
        .descriptors()
        .filter(|d| d.default_policy().kind() == PolicyKind::NoDefault)
        .collect();
    assert_eq!(no_default.len(), 12);

    for descriptor in no_default {
        let resolved = registry.resolve(descriptor.name(), None).unwrap();
        assert_eq!(resolved.value, Value::Null, "{}", descriptor.name());
        assert_eq!(resolved.origin, Origin::Absent);
    }
}

#[test]
fn test_computed_keys_never_default() {
    let registry = schema();
    let computed: Vec<_> = registry.keys_from(KeySource::Function).collect();
    assert_eq!(
        computed,
        vec![
            "currentApiKey",
            "extendedEnvOptions",
            "fetchOptions",
            "mixpanelHost",
            "osVariant",
            "osVersion",
            "provisioned",
            "provisioningOptions",
            "unmanaged",
            "version",
        ]
    );
    for key in computed {
        let err = registry.resolve(key, None).unwrap_err();
        assert_eq!(err, ConfigError::ComputedOnlyWithoutValue(key.to_string()));
    }
}

#[test]
fn test_unknown_key() {
    let err = schema().resolve("apiendpoint", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownKey);
    assert!(schema().lookup("").is_err());
}

#[test]
fn test_all_keys_covers_every_source() {
    let registry = schema();
    assert_eq!(registry.all_keys().len(), 47);
    assert_eq!(registry.keys_from(KeySource::Environment).count(), 18);
    assert_eq!(registry.keys_from(KeySource::Database).count(), 19);
    assert_eq!(registry.keys_from(KeySource::Function).count(), 10);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_listen_port_from_string() {
    let resolved = schema().resolve("listenPort", Some(&json!("48484"))).unwrap();
    assert_eq!(resolved.value, json!(48484));
}

#[test]
fn test_scenario_listen_port_from_number() {
    let resolved = schema().resolve("listenPort", Some(&json!(48484))).unwrap();
    assert_eq!(resolved.value, json!(48484));
}

#[test]
fn test_scenario_listen_port_default() {
    let resolved = schema().resolve("listenPort", None).unwrap();
    assert_eq!(resolved.value, json!(48484));
}

#[test]
fn test_scenario_lock_override_rejects_yes() {
    let err = schema()
        .resolve("lockOverride", Some(&json!("yes")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Coercion);
    assert_eq!(err.key(), "lockOverride");
    assert!(err.to_string().contains(r#""yes""#));
}

#[test]
fn test_permissive_boolean_keys() {
    let registry = schema();
    assert_eq!(registry.decode("delta", &json!("true")).unwrap(), json!(true));
    assert_eq!(registry.decode("delta", &json!("false")).unwrap(), json!(false));
    for raw in [json!("TRUE"), json!(1)] {
        assert_eq!(
            registry.decode("delta", &raw).unwrap_err().kind(),
            ErrorKind::Coercion
        );
    }
}

#[test]
fn test_permissive_number_keys() {
    let registry = schema();
    assert_eq!(registry.decode("deviceId", &json!("42")).unwrap(), json!(42));
    assert_eq!(registry.decode("deviceId", &json!(42)).unwrap(), json!(42));
    for raw in [json!("4x2"), json!("")] {
        assert_eq!(
            registry.decode("deviceId", &raw).unwrap_err().kind(),
            ErrorKind::Coercion
        );
    }
    // Null for a key with a static default is a present, invalid value.
    assert_eq!(
        registry.decode("apiTimeout", &json!(null)).unwrap_err().kind(),
        ErrorKind::Coercion
    );
}

#[test]
fn test_strict_string_keys() {
    let err = schema().decode("apiEndpoint", &json!(80)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralValidation);
}

// =============================================================================
// Embedded Document (pinDevice)
// =============================================================================

#[test]
fn test_pin_device_descriptor() {
    let pin = schema().lookup("pinDevice").unwrap();
    assert_eq!(pin.kind(), ValueKind::Document);
    assert_eq!(pin.default_policy(), &DefaultPolicy::NoDefault);
    assert_eq!(pin.rule().describe(), "json<{app: number, commit: string}>");
}

#[test]
fn test_pin_device_not_json() {
    let err = schema()
        .resolve("pinDevice", Some(&json!("{not json")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::JsonDecode);
}

#[test]
fn test_pin_device_missing_fields() {
    let err = schema().resolve("pinDevice", Some(&json!("{}"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralValidation);
}

#[test]
fn test_pin_device_non_string_is_structural() {
    let registry = schema();
    for raw in [json!(42), json!(true), json!(["app", "commit"])] {
        let err = registry.resolve("pinDevice", Some(&raw)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralValidation, "{raw}");
    }
    let live = json!({"app": 3, "commit": "c"});
    assert_eq!(registry.decode("pinDevice", &live).unwrap(), live);
}

#[test]
fn test_pin_device_absent_and_null() {
    let registry = schema();
    assert!(registry.resolve("pinDevice", None).unwrap().is_null());
    assert!(registry.resolve("pinDevice", Some(&json!(null))).unwrap().is_null());
}

proptest! {
    #[test]
    fn pin_device_round_trips(app in any::<u64>(), commit in "[0-9a-f]{7,40}") {
        let registry = schema();
        let value = json!({"app": app, "commit": commit});
        let stored = registry.encode("pinDevice", &value).unwrap();
        prop_assert!(stored.is_string());
        prop_assert_eq!(registry.decode("pinDevice", &stored).unwrap(), value);
    }
}

// =============================================================================
// Composite Bundles
// =============================================================================

#[test]
fn test_bundles_share_scalar_rules() {
    for (field, scalar) in [
        ("uuid", "uuid"),
        ("applicationId", "applicationId"),
        ("userId", "userId"),
        ("deviceType", "deviceType"),
        ("provisioningApiKey", "apiKey"),
        ("deviceApiKey", "deviceApiKey"),
        ("apiEndpoint", "apiEndpoint"),
        ("apiTimeout", "apiTimeout"),
        ("registered_at", "registered_at"),
        ("deviceId", "deviceId"),
    ] {
        assert_shares_rule("provisioningOptions", field, scalar);
    }

    for (field, scalar) in [
        ("uuid", "uuid"),
        ("listenPort", "listenPort"),
        ("name", "name"),
        ("apiSecret", "apiSecret"),
        ("deviceApiKey", "deviceApiKey"),
        ("version", "version"),
        ("deviceType", "deviceType"),
    ] {
        assert_shares_rule("extendedEnvOptions", field, scalar);
    }

    for (field, scalar) in [
        ("uuid", "uuid"),
        ("currentApiKey", "currentApiKey"),
        ("apiEndpoint", "apiEndpoint"),
        ("deltaEndpoint", "deltaEndpoint"),
        ("delta", "delta"),
        ("deltaRequestTimeout", "deltaRequestTimeout"),
        ("deltaApplyTimeout", "deltaApplyTimeout"),
        ("deltaRetryCount", "deltaRetryCount"),
        ("deltaRetryInterval", "deltaRetryInterval"),
        ("deltaVersion", "deltaVersion"),
    ] {
        assert_shares_rule("fetchOptions", field, scalar);
    }
}

#[test]
fn test_extended_env_os_version_is_the_computed_rule() {
    let registry = schema();
    let bundle = registry.lookup("extendedEnvOptions").unwrap().rule();
    let os_version = registry.lookup("osVersion").unwrap().rule();
    assert!(Rule::same(field_rule(bundle, "osVersion"), os_version));
}

#[test]
fn test_provisioning_options_coerces_like_scalars() {
    let live = json!({
        "uuid": null,
        "applicationId": "1011",
        "deviceType": "raspberrypi4-64",
        "deviceApiKey": "",
        "apiEndpoint": "https://api.balena-cloud.com",
        "apiTimeout": "900000",
        "deviceId": 7,
        "unrelated": "kept"
    });
    let resolved = schema().resolve("provisioningOptions", Some(&live)).unwrap();
    assert_eq!(
        resolved.value,
        json!({
            "uuid": null,
            "applicationId": 1011,
            "deviceType": "raspberrypi4-64",
            "deviceApiKey": "",
            "apiEndpoint": "https://api.balena-cloud.com",
            "apiTimeout": 900000,
            "deviceId": 7,
            "unrelated": "kept"
        })
    );

    let options = schema()
        .computed::<keys::ProvisioningOptions>(&live)
        .unwrap();
    assert_eq!(options.application_id, Some(1011));
    assert_eq!(options.user_id, None);
    assert_eq!(options.registered_at, None);
}

#[test]
fn test_pin_device_round_trips_extra_fields() {
    let registry = schema();
    let value = json!({"app": 1, "commit": "c", "note": "x"});
    let stored = registry.encode("pinDevice", &value).unwrap();
    assert_eq!(registry.decode("pinDevice", &stored).unwrap(), value);
}

#[test]
fn test_pin_device_round_trips_float_app() {
    let registry = schema();
    let value = json!({"app": 1.0715660391465826e-75, "commit": "c"});
    let stored = registry.encode("pinDevice", &value).unwrap();
    assert_eq!(registry.decode("pinDevice", &stored).unwrap(), value);
}

#[test]
fn test_fetch_options_reports_field_path() {
    let live = json!({
        "currentApiKey": "key",
        "apiEndpoint": "https://api.balena-cloud.com",
        "deltaEndpoint": "https://delta.balena-cloud.com",
        "delta": "yes",
        "deltaRequestTimeout": 30000,
        "deltaRetryCount": 30,
        "deltaRetryInterval": 10000,
        "deltaVersion": 3
    });
    let err = schema().resolve("fetchOptions", Some(&live)).unwrap_err();
    match err {
        ConfigError::Invalid { key, source } => {
            assert_eq!(key, "fetchOptions");
            assert_eq!(source.path().to_string(), "delta");
            assert!(source.is_coercion());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mixpanel_host_union() {
    let registry = schema();
    assert!(registry
        .resolve("mixpanelHost", Some(&json!(null)))
        .unwrap()
        .is_null());
    let host = json!({"host": "https://api.balena-cloud.com", "path": "/mixpanel"});
    assert_eq!(registry.decode("mixpanelHost", &host).unwrap(), host);
    assert_eq!(
        registry
            .decode("mixpanelHost", &json!({"host": "only"}))
            .unwrap_err()
            .kind(),
        ErrorKind::StructuralValidation
    );
}

#[test]
fn test_computed_keys_are_not_persistable() {
    let err = schema().encode("version", &json!("v16.1.0")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotPersistable);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_resolution() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let raw = json!(format!("{}", 1000 + i));
                schema().resolve("listenPort", Some(&raw)).unwrap().value
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), json!(1000 + i));
    }
}
