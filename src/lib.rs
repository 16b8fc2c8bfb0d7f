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

//! Rendezvous-descriptor subsystem for a hidden-service implementation.
//!
//! This crate provides:
//! - A bit-exact wire codec for self-signed service descriptors
//! - Service-ID derivation (short, human-comparable hidden-service names)
//! - A process-wide descriptor cache with freshness and monotonic-update rules
//! - A relay-command dispatcher that routes rendezvous cells to handlers
//!
//! Key generation, ASN.1 RSA internals beyond the wire's own DER framing, and
//! the downstream introduction/rendezvous protocol handlers are external
//! collaborators; see [`crypto`] for the narrow boundary this crate expects
//! of them.

/// RSA/digest/base32 crypto collaborator boundary (see `crypto::PublicKey`/`PrivateKey`).
pub mod crypto;
/// Observability (Prometheus metrics for the descriptor cache).
pub mod monitoring;
/// Descriptor codec, service-ID derivation, cache, and relay dispatcher.
pub mod rend;
