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

//! A Bitcoin-style script interpreter: parses a scriptSig/scriptPubKey
//! pair into chunks and runs them as a stack machine, including P2SH
//! redemption and signature checking. The caller supplies the sighash
//! digest (this crate never parses a transaction).

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate enum_primitive;
extern crate failure;
#[macro_use]
extern crate failure_derive;

mod chunk;
mod error;
mod flags;
mod interpreter;
mod num;
mod opcode;
mod parser;
mod sighash;

pub use crate::chunk::{ScriptChunk, MAX_SCRIPT_ELEMENT_SIZE};
pub use crate::error::{Error, ErrorKind};
pub use crate::flags::VerifyFlags;
pub use crate::interpreter::{correctly_spends, ExecContext};
pub use crate::num::{cast_to_bool, decode_num, encode_num};
pub use crate::opcode::{is_direct_push, Opcode};
pub use crate::parser::parse;
pub use crate::sighash::SighashProvider;
