//! Seams between the collector and the Airthings cloud.

use crate::api::auth::AccessToken;
use crate::api::models::{DeviceRecord, SampleData};
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;

/// Source of bearer tokens for the Airthings cloud API.
///
/// Implementations are expected to cache tokens themselves; the collector
/// asks for one at the start of every scrape.
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token.
    fn token(&self) -> impl Future<Output = Result<AccessToken>> + Send;
}

/// The two Airthings cloud calls the exporter depends on.
///
/// No retries happen at this level; a failed call is reported to the caller
/// as-is.
pub trait AirthingsApi: Send + Sync {
    /// List every device visible to the authenticated account.
    fn fetch_inventory(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Vec<DeviceRecord>>> + Send;

    /// Fetch the most recent readings of a single device.
    fn fetch_latest_samples(
        &self,
        token: &AccessToken,
        device_id: &str,
    ) -> impl Future<Output = Result<SampleData>> + Send;
}

impl<T: TokenSource> TokenSource for Arc<T> {
    fn token(&self) -> impl Future<Output = Result<AccessToken>> + Send {
        (**self).token()
    }
}

impl<A: AirthingsApi> AirthingsApi for Arc<A> {
    fn fetch_inventory(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Vec<DeviceRecord>>> + Send {
        (**self).fetch_inventory(token)
    }

    fn fetch_latest_samples(
        &self,
        token: &AccessToken,
        device_id: &str,
    ) -> impl Future<Output = Result<SampleData>> + Send {
        (**self).fetch_latest_samples(token, device_id)
    }
}
