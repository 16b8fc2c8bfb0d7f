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

//! Descriptor codec, service-ID derivation, descriptor cache, and relay dispatcher.

mod cache;
mod descriptor;
mod dispatch;
mod service_id;

pub use cache::{Cache, CacheConfig, CacheError, CacheStats, InvalidQuery, StoreOutcome};
pub use descriptor::{encode, parse, CodecError, DescriptorError, EncodedDescriptor, ServiceDescriptor};
pub use dispatch::{dispatch, RelayCommand, RelayHandlers};
pub use service_id::{IdError, ServiceId, ServiceIdParseError, SID_LEN};
