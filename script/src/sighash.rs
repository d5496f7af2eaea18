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

//! The signature-hash callback `OP_CHECKSIG`/`OP_CHECKMULTISIG` need.
//! Computing a transaction's sighash requires the surrounding
//! transaction and input set, neither of which this crate models;
//! callers implement this trait over whatever transaction type they
//! have.

use bsv_core::Hash;

/// Computes the signature hash a `CHECKSIG`-family opcode verifies
/// against.
pub trait SighashProvider {
	/// The digest signed for input `input_index`, given the already
	/// `OP_CODESEPARATOR`-sliced and signature-stripped sub-script and
	/// the sighash type byte taken from the trailing byte of the
	/// signature being checked.
	fn hash_for_signature(&self, input_index: usize, sub_script: &[u8], sighash_type: u8) -> Hash;
}
