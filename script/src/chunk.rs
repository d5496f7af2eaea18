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

//! A single parsed unit of a script program: either an opcode byte or
//! a literal push, tagged with its starting offset in the original
//! program so `OP_CODESEPARATOR` can record where the next sub-script
//! begins.

/// Maximum size of a single literal push, per the reference client.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// One parsed chunk of a script program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptChunk {
	/// A single opcode byte, not a push.
	Op {
		/// The opcode byte value.
		code: u8,
		/// Byte offset of this opcode in the original program.
		start: usize,
	},
	/// A literal byte-string push.
	Push {
		/// The pushed bytes.
		data: Vec<u8>,
		/// Byte offset of the opcode (or length prefix) that introduced
		/// this push in the original program.
		start: usize,
	},
}

impl ScriptChunk {
	/// Starting byte offset of this chunk in the original program.
	pub fn start(&self) -> usize {
		match self {
			ScriptChunk::Op { start, .. } => *start,
			ScriptChunk::Push { start, .. } => *start,
		}
	}
}
