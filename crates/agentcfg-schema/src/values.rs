//! Rust types for composite configuration values.
//!
//! Field names follow the registry's camelCase JSON names. Nullable fields
//! are `Option`s; numbers are unsigned because every numeric setting is a
//! count, an id, a port or a duration in milliseconds.

use serde::{Deserialize, Serialize};

/// Pins the device to one release of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDevice {
    /// Application id.
    pub app: u64,
    /// Release commit hash.
    pub commit: String,
}

/// Values needed to provision the device against the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningOptions {
    /// Device UUID; `None` before one is generated.
    pub uuid: Option<String>,
    /// Application the device joins, if known.
    pub application_id: Option<u64>,
    /// Owning user, if known.
    pub user_id: Option<u64>,
    /// Device type slug.
    pub device_type: String,
    /// Key used to register the device; `None` once registered.
    pub provisioning_api_key: Option<String>,
    /// Device-scoped API key, empty until generated.
    pub device_api_key: String,
    /// API base URL.
    pub api_endpoint: String,
    /// Milliseconds.
    pub api_timeout: u64,
    /// Registration time in milliseconds since the epoch; `None` until registered.
    #[serde(rename = "registered_at")]
    pub registered_at: Option<u64>,
    /// API id of the device; `None` until registered.
    pub device_id: Option<u64>,
}

/// Analytics endpoint split into host and path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixpanelHost {
    /// Scheme and host.
    pub host: String,
    /// Path prefix on `host`.
    pub path: String,
}

/// Extra environment exposed to services on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedEnvOptions {
    /// Device UUID, if provisioned.
    pub uuid: Option<String>,
    /// Local API port.
    pub listen_port: u16,
    /// Device name.
    pub name: String,
    /// Local API secret, if generated.
    pub api_secret: Option<String>,
    /// Device-scoped API key, possibly empty.
    pub device_api_key: String,
    /// Agent version.
    pub version: String,
    /// Device type slug.
    pub device_type: String,
    /// Host OS version; `None` when it cannot be read.
    pub os_version: Option<String>,
}

/// Settings for fetching images, including delta downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOptions {
    /// Device UUID, if provisioned.
    pub uuid: Option<String>,
    /// API key currently in use.
    pub current_api_key: String,
    /// API base URL.
    pub api_endpoint: String,
    /// Delta server URL.
    pub delta_endpoint: String,
    /// Whether delta downloads are enabled.
    pub delta: bool,
    /// Milliseconds.
    pub delta_request_timeout: u64,
    /// Milliseconds; `None` for no limit.
    pub delta_apply_timeout: Option<u64>,
    /// Attempts before falling back to a full download.
    pub delta_retry_count: u64,
    /// Milliseconds between attempts.
    pub delta_retry_interval: u64,
    /// Delta protocol version.
    pub delta_version: u64,
}
