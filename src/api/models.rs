//! Wire types for the Airthings cloud API.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Raw reading values keyed by reading name, e.g. `"co2" -> 450.0`.
///
/// Values are kept as JSON because the same map carries non-numeric fields
/// such as `relayDeviceType`.
pub type SampleData = HashMap<String, serde_json::Value>;

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Body of `GET /v1/devices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevicesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<DeviceRecord>,
}

/// One device as reported by the inventory endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Serial number, used as the path parameter for sample requests
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sensors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub segment: Segment,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: Location,
}

/// Segment a device is currently recording into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
}

/// Location a device is registered at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Body of `GET /v1/devices/{serialNumber}/latest-samples`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestSamplesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: SampleData,
}

/// Body of a successful client-credentials token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}
