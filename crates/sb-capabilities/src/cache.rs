//! Request-scoped capability memo.
//!
//! The cache is owned by the caller and handed to a [`CachedCapabilities`]
//! view; there is no process-wide state. One cache may be shared by many
//! threads validating a batch.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use sb_core::Frequency;
use sb_model::{ArrayAssembly, Band5bSubband, ReceiverBand, TelescopeType};
use tracing::trace;

use crate::error::CapabilityResult;
use crate::parameter::SubarrayParameter;
use crate::provider::{CapabilityProvider, FrequencyBand};

type CacheKey = (TelescopeType, ArrayAssembly, SubarrayParameter);

#[derive(Debug, Default)]
pub struct CapabilityCache {
    values: Mutex<HashMap<CacheKey, f64>>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, computing and storing it on a miss.
    /// Failed lookups are not cached.
    pub fn get_or_try_insert(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> CapabilityResult<f64>,
    ) -> CapabilityResult<f64> {
        if let Some(value) = self.lock().get(&key) {
            return Ok(*value);
        }
        // Computed outside the lock; a concurrent miss on the same key stores
        // the same value twice.
        let value = compute()?;
        trace!(telescope = %key.0, array_assembly = %key.1, parameter = %key.2, value, "capability cached");
        self.lock().insert(key, value);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, f64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A provider whose subarray parameters go through a [`CapabilityCache`].
pub struct CachedCapabilities<'a, P: CapabilityProvider + ?Sized> {
    inner: &'a P,
    cache: &'a CapabilityCache,
}

impl<'a, P: CapabilityProvider + ?Sized> CachedCapabilities<'a, P> {
    pub fn new(inner: &'a P, cache: &'a CapabilityCache) -> Self {
        Self { inner, cache }
    }
}

impl<P: CapabilityProvider + ?Sized> CapabilityProvider for CachedCapabilities<'_, P> {
    fn subarray_parameter(
        &self,
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
        parameter: SubarrayParameter,
    ) -> CapabilityResult<f64> {
        self.cache
            .get_or_try_insert((telescope, array_assembly, parameter), || {
                self.inner
                    .subarray_parameter(telescope, array_assembly, parameter)
            })
    }

    fn frequency_band(
        &self,
        band: ReceiverBand,
        subband: Option<Band5bSubband>,
    ) -> CapabilityResult<FrequencyBand> {
        self.inner.frequency_band(band, subband)
    }

    fn global_frequency_bounds(
        &self,
        telescope: TelescopeType,
    ) -> CapabilityResult<(Frequency, Frequency)> {
        self.inner.global_frequency_bounds(telescope)
    }

    fn channel_width(&self, telescope: TelescopeType) -> Frequency {
        self.inner.channel_width(telescope)
    }

    fn frequency_slice_bandwidth(&self) -> Frequency {
        self.inner.frequency_slice_bandwidth()
    }
}
