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

//! Shared hash, header, chain-info and serialization primitives used by
//! both the chain engine and the script interpreter.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

extern crate byteorder;
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate num_bigint;
extern crate num_traits;
extern crate serde;
extern crate sha2;

pub mod chain_info;
pub mod consensus;
pub mod error;
pub mod hash;
pub mod header;
pub mod merkle;
pub mod ser;
pub mod stored_block;
pub mod target;

pub use chain_info::ChainInfo;
pub use error::{Error, ErrorKind};
pub use hash::{Hash, Hashed, ZERO_HASH};
pub use header::Header;
pub use merkle::merkle_root;
pub use stored_block::StoredBlock;
pub use target::Work;
