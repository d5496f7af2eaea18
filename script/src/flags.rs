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

//! Per-verification flags threaded through `correctly_spends`.

bitflags! {
	/// Toggles for behavior `correctly_spends` gates on. Only `P2SH` is
	/// acted on today; `CLTV`/`CSV` are reserved bit positions for a
	/// future upgrade of `OP_NOP2`/`OP_NOP3` and are accepted but
	/// currently have no effect.
	pub struct VerifyFlags: u32 {
		/// No flags set: `OP_NOP1..OP_NOP10` are all plain no-ops and
		/// P2SH redemption is not evaluated.
		const NONE = 0b0000_0000;
		/// Enforce BIP16-style P2SH redemption (step 6 of
		/// `correctly_spends`).
		const P2SH = 0b0000_0001;
		/// Reserved for a future `OP_CHECKLOCKTIMEVERIFY` upgrade of
		/// `OP_NOP2`. Not implemented: setting it has no effect.
		const CHECKLOCKTIMEVERIFY = 0b0000_0010;
		/// Reserved for a future `OP_CHECKSEQUENCEVERIFY` upgrade of
		/// `OP_NOP3`. Not implemented: setting it has no effect.
		const CHECKSEQUENCEVERIFY = 0b0000_0100;
	}
}

impl Default for VerifyFlags {
	fn default() -> VerifyFlags {
		VerifyFlags::P2SH
	}
}
