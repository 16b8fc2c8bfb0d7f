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

//! The process-wide service descriptor cache.
//!
//! Modeled as an explicit value (not a hidden singleton) so it can be
//! constructed fresh per test; a module-level default would only be a thin
//! `once_cell`/`OnceLock` wrapper around the same type. All mutation goes
//! through [`Cache::store`] and [`Cache::clean`] behind one exclusive lock —
//! §5 forbids finer-grained locking because [`Cache::lookup`] must observe a
//! value that cannot change mid-read. Unlike the pointer-returning original,
//! `lookup` here copies the bytes out, which is the Rust-idiomatic way to
//! honor "valid until the next mutating call" without unsafe aliasing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::crypto::PublicKey;
use crate::monitoring::metrics::Metrics;

use super::descriptor::{self, CodecError, EncodedDescriptor, ServiceDescriptor};
use super::service_id::{IdError, ServiceId, ServiceIdParseError};

/// Freshness window configuration (§4.3.1).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Descriptors older than `now - max_age_secs` are rejected and cleaned.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// Descriptors timestamped more than `max_skew_secs` in the future are rejected.
    #[serde(default = "default_max_skew_secs")]
    pub max_skew_secs: u64,
}

fn default_max_age_secs() -> u64 {
    86_400
}

fn default_max_skew_secs() -> u64 {
    5_400
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            max_skew_secs: default_max_skew_secs(),
        }
    }
}

struct CacheEntry<P: PublicKey> {
    parsed: ServiceDescriptor<P>,
    encoded: EncodedDescriptor,
    received: SystemTime,
}

/// Outcome of a successful [`Cache::store`] call — all three are "success"
/// at the wire boundary (§4.3.3 returns 0 for all of them).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The descriptor was inserted or replaced an older one.
    Stored,
    /// An existing entry has a timestamp greater than or equal to the new
    /// one; the new descriptor was dropped.
    AlreadyNewer,
    /// The stored bytes are byte-identical to an existing entry; only
    /// `received` was refreshed.
    Duplicate,
}

/// Failures from [`Cache::store`] (§7, `CacheError::Rejected`).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The descriptor failed to parse or verify.
    #[error("descriptor rejected: {0}")]
    Codec(#[from] CodecError),
    /// The service ID could not be derived from the embedded key.
    #[error("service id derivation failed: {0}")]
    Id(#[from] IdError),
    /// `timestamp < now - max_age`.
    #[error("descriptor is too old")]
    Stale,
    /// `timestamp > now + max_skew`.
    #[error("descriptor is too far in the future")]
    FutureDated,
}

/// `lookup` was called with a string that is not a well-formed service ID.
#[derive(Debug, Error)]
#[error("query is not a well-formed service id: {0}")]
pub struct InvalidQuery(#[from] ServiceIdParseError);

/// A point-in-time readout of cache occupancy, for observability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently cached.
    pub entries: usize,
}

fn secs_since_epoch(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// The descriptor cache: service ID → latest accepted descriptor.
pub struct Cache<P: PublicKey> {
    config: CacheConfig,
    entries: Mutex<BTreeMap<ServiceId, CacheEntry<P>>>,
    metrics: Option<Arc<Metrics>>,
}

impl<P: PublicKey> Cache<P> {
    /// Create an empty cache with the given freshness configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(BTreeMap::new()),
            metrics: None,
        }
    }

    /// Attach a metrics sink; cache operations update its gauges/counters.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Parse, verify, and admit an encoded descriptor (§4.3.3).
    ///
    /// Acceptance, "already have a newer one", and "byte-identical
    /// duplicate" are all `Ok` — none of them is the caller's problem to
    /// handle differently. Only a parse/freshness failure is `Err`.
    pub fn store(&self, bytes: &[u8], now: SystemTime) -> Result<StoreOutcome, CacheError> {
        let parsed = descriptor::parse::<P>(bytes).map_err(|e| {
            if let Some(m) = &self.metrics {
                m.descriptor_cache_rejected_total.inc();
            }
            warn!(error = %e, "rejecting malformed service descriptor");
            e
        })?;
        let id = ServiceId::for_key(parsed.public_key())?;

        let now_secs = secs_since_epoch(now);
        let ts = parsed.timestamp() as u64;
        let floor = now_secs.saturating_sub(self.config.max_age_secs);
        let ceiling = now_secs.saturating_add(self.config.max_skew_secs);
        if ts < floor {
            if let Some(m) = &self.metrics {
                m.descriptor_cache_rejected_total.inc();
            }
            warn!(%id, "rejecting stale service descriptor");
            return Err(CacheError::Stale);
        }
        if ts > ceiling {
            if let Some(m) = &self.metrics {
                m.descriptor_cache_rejected_total.inc();
            }
            warn!(%id, "rejecting future-dated service descriptor");
            return Err(CacheError::FutureDated);
        }

        let mut entries = self.entries.lock().expect("descriptor cache mutex poisoned");
        let outcome = match entries.get_mut(&id) {
            Some(existing) if existing.encoded.as_bytes() == bytes => {
                existing.received = now;
                debug!(%id, "duplicate service descriptor, refreshed received time");
                StoreOutcome::Duplicate
            }
            // Equal timestamps resolve to first-wins (§5 Ordering): the
            // existing entry is kept rather than replaced.
            Some(existing) if existing.parsed.timestamp() >= parsed.timestamp() => {
                debug!(%id, "already have a newer or equally fresh service descriptor");
                StoreOutcome::AlreadyNewer
            }
            _ => {
                entries.insert(
                    id,
                    CacheEntry {
                        parsed,
                        encoded: EncodedDescriptor::from(bytes.to_vec()),
                        received: now,
                    },
                );
                info!(%id, "stored service descriptor");
                StoreOutcome::Stored
            }
        };

        if let Some(m) = &self.metrics {
            m.descriptor_cache_entries.set(entries.len() as i64);
            if outcome == StoreOutcome::Stored {
                m.descriptor_cache_stores_total.inc();
            }
        }
        Ok(outcome)
    }

    /// Look up the last-stored encoded bytes for a service ID (§4.3.2).
    ///
    /// Returns `Ok(None)` for a well-formed ID with no entry; `Err` only for
    /// a malformed query string.
    pub fn lookup(&self, query: &str) -> Result<Option<Vec<u8>>, InvalidQuery> {
        let id: ServiceId = query.parse()?;
        let entries = self.entries.lock().expect("descriptor cache mutex poisoned");
        Ok(entries.get(&id).map(|e| e.encoded.as_bytes().to_vec()))
    }

    /// Remove every entry whose timestamp is older than `now - max_age` (§4.3.4).
    ///
    /// Returns the number of entries removed.
    pub fn clean(&self, now: SystemTime) -> usize {
        let floor = secs_since_epoch(now).saturating_sub(self.config.max_age_secs);
        let mut entries = self.entries.lock().expect("descriptor cache mutex poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.parsed.timestamp() as u64 >= floor);
        let removed = before - entries.len();

        if removed > 0 {
            info!(removed, "cleaned stale service descriptors");
        }
        if let Some(m) = &self.metrics {
            m.descriptor_cache_entries.set(entries.len() as i64);
            m.descriptor_cache_cleaned_total.inc_by(removed as u64);
        }
        removed
    }

    /// A point-in-time readout of cache occupancy.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().expect("descriptor cache mutex poisoned");
        CacheStats {
            entries: entries.len(),
        }
    }

    /// Wire-compatible adapter over [`Cache::store`]: `0` on acceptance (or
    /// either benign non-error outcome), `-1` on any rejection (§4.3.3, §7).
    /// Structured callers within this crate's own Rust boundary should
    /// prefer `store` directly; this exists only for parity with the
    /// original `rend_cache_store` return convention.
    pub fn store_wire(&self, bytes: &[u8], now: SystemTime) -> i32 {
        match self.store(bytes, now) {
            Ok(_) => 0,
            Err(_) => -1,
        }
    }

    /// Wire-compatible adapter over [`Cache::lookup`]: `-1` for a malformed
    /// query, `0` for a well-formed but absent ID, or the positive byte
    /// length of the match, with the bytes written into `out` (§4.3.2, §7).
    pub fn lookup_wire(&self, query: &str, out: &mut Vec<u8>) -> i32 {
        match self.lookup(query) {
            Err(_) => -1,
            Ok(None) => 0,
            Ok(Some(bytes)) => {
                let len = bytes.len();
                *out = bytes;
                len as i32
            }
        }
    }
}
