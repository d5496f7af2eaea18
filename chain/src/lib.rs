// Copyright 2016 The Grin Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Header ingestion, orphan handling, fork tracking and reorganization
//! for a headers-only chain engine: the store, the rule checker, and
//! the network's codec are all supplied by the embedding application;
//! this crate owns only the shared ingest/reorg algorithm.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

#[macro_use]
extern crate bitflags;
extern crate failure;
#[macro_use]
extern crate failure_derive;

mod chain;
pub mod error;
pub mod pipe;
pub mod promise;
pub mod store;
pub mod types;

pub use crate::chain::Chain;
pub use crate::error::{Error, ErrorKind};
pub use crate::promise::{HeightFuture, HeightPromise};
pub use crate::store::{test_support, MemoryBlockStore};
pub use crate::types::{AddResult, BlockStore, Executor, Options, RuleChecker, RuleCheckerFactory, SameThreadExecutor};
