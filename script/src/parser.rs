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

//! Parses a raw script program into [`ScriptChunk`]s: direct pushes
//! (`0x01..=0x4b`), the three length-prefixed `OP_PUSHDATA*` pushes,
//! `OP_0` (an empty push), and everything else as a bare opcode byte.

use byteorder::{ByteOrder, LittleEndian};

use crate::chunk::ScriptChunk;
use crate::error::{Error, ErrorKind};
use crate::opcode::Opcode;

/// Parses `program` into its chunk sequence, left to right.
///
/// Lengths read for `OP_PUSHDATA2`/`OP_PUSHDATA4` are taken from four
/// (respectively two) *distinct* bytes of the input — a correctness
/// requirement, not an implementation detail: a length decoder that
/// reuses a byte across shift amounts silently truncates long pushes.
pub fn parse(program: &[u8]) -> Result<Vec<ScriptChunk>, Error> {
	let mut chunks = Vec::new();
	let mut pos = 0usize;

	while pos < program.len() {
		let start = pos;
		let opcode = program[pos];
		pos += 1;

		if opcode == Opcode::OP_0.as_u8() {
			chunks.push(ScriptChunk::Push { data: Vec::new(), start });
			continue;
		}

		if (1..=0x4b).contains(&opcode) {
			let len = opcode as usize;
			let data = take(program, &mut pos, len)?;
			chunks.push(ScriptChunk::Push { data, start });
			continue;
		}

		if opcode == Opcode::OP_PUSHDATA1.as_u8() {
			let len = take(program, &mut pos, 1)?[0] as usize;
			let data = take(program, &mut pos, len)?;
			chunks.push(ScriptChunk::Push { data, start });
			continue;
		}

		if opcode == Opcode::OP_PUSHDATA2.as_u8() {
			let len_bytes = take(program, &mut pos, 2)?;
			let len = LittleEndian::read_u16(&len_bytes) as usize;
			let data = take(program, &mut pos, len)?;
			chunks.push(ScriptChunk::Push { data, start });
			continue;
		}

		if opcode == Opcode::OP_PUSHDATA4.as_u8() {
			let len_bytes = take(program, &mut pos, 4)?;
			let len = LittleEndian::read_u32(&len_bytes) as usize;
			let data = take(program, &mut pos, len)?;
			chunks.push(ScriptChunk::Push { data, start });
			continue;
		}

		chunks.push(ScriptChunk::Op { code: opcode, start });
	}

	Ok(chunks)
}

fn take(program: &[u8], pos: &mut usize, len: usize) -> Result<Vec<u8>, Error> {
	let end = pos
		.checked_add(len)
		.filter(|&e| e <= program.len())
		.ok_or_else(|| ErrorKind::MalformedPush("push runs past end of program".to_owned()))?;
	let data = program[*pos..end].to_vec();
	*pos = end;
	Ok(data)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parses_direct_push() {
		let program = [0x01, 0xab];
		let chunks = parse(&program).unwrap();
		assert_eq!(chunks, vec![ScriptChunk::Push { data: vec![0xab], start: 0 }]);
	}

	#[test]
	fn parses_op_0_as_empty_push() {
		let chunks = parse(&[0x00]).unwrap();
		assert_eq!(chunks, vec![ScriptChunk::Push { data: vec![], start: 0 }]);
	}

	#[test]
	fn parses_pushdata2_with_four_hundred_byte_push() {
		let mut program = vec![0x4d, 0x90, 0x01]; // 0x0190 = 400, little-endian
		program.extend(std::iter::repeat(0x42).take(400));
		let chunks = parse(&program).unwrap();
		match &chunks[0] {
			ScriptChunk::Push { data, start } => {
				assert_eq!(data.len(), 400);
				assert_eq!(*start, 0);
			}
			_ => panic!("expected a push chunk"),
		}
	}

	#[test]
	fn parses_pushdata4_with_distinct_length_bytes() {
		// length 0x01020304 would be absurd to actually allocate; use a
		// realistic but still >0xffff length to prove all four bytes are
		// read (not the same byte four times).
		let len: u32 = 70_000;
		let mut program = vec![0x4e];
		let mut len_bytes = [0u8; 4];
		LittleEndian::write_u32(&mut len_bytes, len);
		program.extend_from_slice(&len_bytes);
		program.extend(std::iter::repeat(0x07).take(len as usize));
		let chunks = parse(&program).unwrap();
		match &chunks[0] {
			ScriptChunk::Push { data, .. } => assert_eq!(data.len(), len as usize),
			_ => panic!("expected a push chunk"),
		}
	}

	#[test]
	fn truncated_push_is_malformed() {
		assert!(parse(&[0x05, 0x01, 0x02]).is_err());
	}

	#[test]
	fn bare_opcode_is_an_op_chunk() {
		let chunks = parse(&[0x76]).unwrap(); // OP_DUP
		assert_eq!(chunks, vec![ScriptChunk::Op { code: 0x76, start: 0 }]);
	}
}
