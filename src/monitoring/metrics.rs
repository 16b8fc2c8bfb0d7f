// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use prometheus::{IntCounter, IntGauge, Registry};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
}

/// Metrics container. Wiring a `Metrics` into a [`crate::rend::Cache`] is
/// optional — the cache functions correctly with no metrics at all.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Entries currently held in the descriptor cache.
    pub descriptor_cache_entries: IntGauge,
    /// Descriptors accepted and stored (replacing or adding an entry).
    pub descriptor_cache_stores_total: IntCounter,
    /// Descriptors rejected during `store` (stale, future-dated, or malformed).
    pub descriptor_cache_rejected_total: IntCounter,
    /// Entries removed by `clean` for exceeding the max-age window.
    pub descriptor_cache_cleaned_total: IntCounter,
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let descriptor_cache_entries = IntGauge::new(
            "rendcore_descriptor_cache_entries",
            "Entries currently held in the descriptor cache",
        )
        .map_err(|_| MetricsError::Prom)?;
        let descriptor_cache_stores_total = IntCounter::new(
            "rendcore_descriptor_cache_stores_total",
            "Descriptors accepted and stored",
        )
        .map_err(|_| MetricsError::Prom)?;
        let descriptor_cache_rejected_total = IntCounter::new(
            "rendcore_descriptor_cache_rejected_total",
            "Descriptors rejected during store",
        )
        .map_err(|_| MetricsError::Prom)?;
        let descriptor_cache_cleaned_total = IntCounter::new(
            "rendcore_descriptor_cache_cleaned_total",
            "Entries removed for exceeding the max-age window",
        )
        .map_err(|_| MetricsError::Prom)?;

        registry
            .register(Box::new(descriptor_cache_entries.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(descriptor_cache_stores_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(descriptor_cache_rejected_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(descriptor_cache_cleaned_total.clone()))
            .map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            registry,
            descriptor_cache_entries,
            descriptor_cache_stores_total,
            descriptor_cache_rejected_total,
            descriptor_cache_cleaned_total,
        })
    }
}
