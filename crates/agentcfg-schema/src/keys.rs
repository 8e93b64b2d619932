//! Marker types for every built-in configuration key.
//!
//! ```rust
//! use agentcfg_schema::keys::{self, SchemaKey};
//!
//! assert_eq!(keys::RegisteredAt::NAME, "registered_at");
//! ```

use crate::descriptor::PolicyKind;
use crate::error::SchemaError;
use crate::registry::ConfigSchema;
use crate::typed::{Computed, Nullable, Policy, Static};
use crate::values;

pub use crate::typed::SchemaKey;

macro_rules! schema_keys {
    ($(
        $(#[$meta:meta])*
        $marker:ident => $name:literal : $value:ty, $policy:ty;
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $marker;

            impl SchemaKey for $marker {
                const NAME: &'static str = $name;
                type Value = $value;
                type Policy = $policy;
            }
        )*

        /// Name and policy of every typed key, in declaration order.
        pub const ALL: &[(&str, PolicyKind)] = &[$(($name, <$policy as Policy>::KIND)),*];

        /// Resolves the default of every defaultable marker into its Rust type.
        pub(crate) fn check_defaults(registry: &ConfigSchema) -> Result<(), SchemaError> {
            $(
                if let Some(Err(source)) = <$policy as Policy>::typed_default::<$marker>(registry) {
                    return Err(SchemaError::DefaultTypeMismatch {
                        key: $name.to_string(),
                        source,
                    });
                }
            )*
            Ok(())
        }
    };
}

schema_keys! {
    // Config file / environment
    /// API base URL.
    ApiEndpoint => "apiEndpoint": String, Static;
    /// API request timeout in milliseconds.
    ApiTimeout => "apiTimeout": u64, Static;
    /// Local API port.
    ListenPort => "listenPort": u16, Static;
    DeltaEndpoint => "deltaEndpoint": String, Static;
    /// Device UUID, absent before provisioning.
    Uuid => "uuid": Option<String>, Nullable;
    /// Provisioning API key.
    ApiKey => "apiKey": Option<String>, Nullable;
    DeviceApiKey => "deviceApiKey": String, Static;
    DeviceType => "deviceType": String, Static;
    Username => "username": Option<String>, Nullable;
    UserId => "userId": Option<u64>, Nullable;
    DeviceId => "deviceId": Option<u64>, Nullable;
    /// Registration time, milliseconds since the epoch.
    RegisteredAt => "registered_at": Option<u64>, Nullable;
    ApplicationId => "applicationId": Option<u64>, Nullable;
    AppUpdatePollInterval => "appUpdatePollInterval": u64, Static;
    MixpanelToken => "mixpanelToken": String, Static;
    BootstrapRetryDelay => "bootstrapRetryDelay": u64, Static;
    Hostname => "hostname": Option<String>, Nullable;
    PersistentLogging => "persistentLogging": bool, Static;

    // Database
    ApiSecret => "apiSecret": Option<String>, Nullable;
    Name => "name": String, Static;
    InitialConfigReported => "initialConfigReported": String, Static;
    InitialConfigSaved => "initialConfigSaved": bool, Static;
    ContainersNormalised => "containersNormalised": bool, Static;
    LoggingEnabled => "loggingEnabled": bool, Static;
    ConnectivityCheckEnabled => "connectivityCheckEnabled": bool, Static;
    Delta => "delta": bool, Static;
    DeltaRequestTimeout => "deltaRequestTimeout": u64, Static;
    DeltaApplyTimeout => "deltaApplyTimeout": Option<u64>, Nullable;
    DeltaRetryCount => "deltaRetryCount": u64, Static;
    DeltaRetryInterval => "deltaRetryInterval": u64, Static;
    DeltaVersion => "deltaVersion": u64, Static;
    /// Overrides update locks held by services.
    LockOverride => "lockOverride": bool, Static;
    LegacyAppsPresent => "legacyAppsPresent": bool, Static;
    /// Release pin, stored as a JSON string.
    PinDevice => "pinDevice": Option<values::PinDevice>, Nullable;
    CurrentCommit => "currentCommit": Option<String>, Nullable;
    TargetStateSet => "targetStateSet": bool, Static;
    LocalMode => "localMode": bool, Static;

    // Computed
    /// Agent version.
    Version => "version": String, Computed;
    CurrentApiKey => "currentApiKey": String, Computed;
    Provisioned => "provisioned": bool, Computed;
    OsVersion => "osVersion": Option<String>, Computed;
    OsVariant => "osVariant": Option<String>, Computed;
    ProvisioningOptions => "provisioningOptions": values::ProvisioningOptions, Computed;
    MixpanelHost => "mixpanelHost": Option<values::MixpanelHost>, Computed;
    ExtendedEnvOptions => "extendedEnvOptions": values::ExtendedEnvOptions, Computed;
    FetchOptions => "fetchOptions": values::FetchOptions, Computed;
    /// Device runs without a cloud connection.
    Unmanaged => "unmanaged": bool, Computed;
}
