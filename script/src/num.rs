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

//! Bitcoin's sign-magnitude ("MPI") integer encoding used for stack
//! values: little-endian magnitude bytes, with the sign folded into
//! the high bit of the last byte. Not a general big-integer codec —
//! script numbers are bounded to 4-byte operands.

use crate::error::{Error, ErrorKind};

/// Decodes a stack item as a script number. Rejects operands longer
/// than 4 bytes, matching the reference client's `CScriptNum`.
pub fn decode_num(bytes: &[u8]) -> Result<i64, Error> {
	if bytes.len() > 4 {
		return Err(ErrorKind::NumberOverflow.into());
	}
	if bytes.is_empty() {
		return Ok(0);
	}
	let mut result: i64 = 0;
	for (i, &b) in bytes.iter().enumerate() {
		result |= (b as i64) << (8 * i);
	}
	let last = bytes.len() - 1;
	if bytes[last] & 0x80 != 0 {
		result &= !(0x80i64 << (8 * last));
		result = -result;
	}
	Ok(result)
}

/// Encodes `n` as a minimally-sized sign-magnitude byte string.
pub fn encode_num(n: i64) -> Vec<u8> {
	if n == 0 {
		return Vec::new();
	}
	let negative = n < 0;
	let mut abs = (n.unsigned_abs()) as u64;
	let mut out = Vec::new();
	while abs > 0 {
		out.push((abs & 0xff) as u8);
		abs >>= 8;
	}
	let last = out.len() - 1;
	if out[last] & 0x80 != 0 {
		out.push(if negative { 0x80 } else { 0x00 });
	} else if negative {
		out[last] |= 0x80;
	}
	out
}

/// Bitcoin's `castToBool`: a byte string is "true" iff it has any
/// non-zero byte, except that a single trailing `0x80` — negative zero
/// — counts as false.
pub fn cast_to_bool(bytes: &[u8]) -> bool {
	for (i, &b) in bytes.iter().enumerate() {
		if b != 0 {
			if i == bytes.len() - 1 && b == 0x80 {
				return false;
			}
			return true;
		}
	}
	false
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn zero_round_trips_as_empty() {
		assert_eq!(encode_num(0), Vec::<u8>::new());
		assert_eq!(decode_num(&[]).unwrap(), 0);
	}

	#[test]
	fn small_positive_and_negative_round_trip() {
		for n in [1i64, 127, 128, 255, 256, 32767, 32768, -1, -127, -128, -32768] {
			let encoded = encode_num(n);
			assert!(encoded.len() <= 4, "n={} encoded to {} bytes", n, encoded.len());
			assert_eq!(decode_num(&encoded).unwrap(), n, "n={}", n);
		}
	}

	#[test]
	fn operand_over_four_bytes_is_rejected() {
		assert!(decode_num(&[1, 2, 3, 4, 5]).is_err());
	}

	#[test]
	fn cast_to_bool_rejects_negative_zero() {
		assert!(!cast_to_bool(&[0x80]));
		assert!(!cast_to_bool(&[0x00]));
		assert!(!cast_to_bool(&[]));
		assert!(cast_to_bool(&[0x01]));
		// trailing 0x80 only counts as negative zero when it's the sole
		// nonzero byte and the final one; a nonzero byte earlier makes
		// the value true regardless of what follows.
		assert!(cast_to_bool(&[0x01, 0x80]));
		assert!(!cast_to_bool(&[0x00, 0x80]));
	}
}
