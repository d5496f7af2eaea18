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

//! Compact "bits" target decoding and cumulative chain work, the
//! proof-of-work analogue of `grin_core::core::target::Difficulty` for a
//! SHA-256-based, compact-encoded target rather than a Cuckoo-cycle
//! difficulty.

use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;
use std::ops::Add;

use crate::hash::Hash;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// The largest target representable, i.e. the lowest possible difficulty.
pub fn max_target() -> BigUint {
	BigUint::from_bytes_be(&[0xff; 32])
}

/// Decodes a compact "bits" u32 into its 256-bit target.
///
/// The encoding is exponent-in-high-byte, 3-byte mantissa: given
/// `bits = (exponent << 24) | mantissa`, the target is
/// `mantissa * 256^(exponent - 3)`, clamped to zero for a negative
/// (sign bit set) mantissa, matching the reference client's
/// "negative" compact encoding.
pub fn bits_to_target(bits: u32) -> BigUint {
	let exponent = (bits >> 24) as i32;
	let mut mantissa = bits & 0x007f_ffff;
	let is_negative = bits & 0x0080_0000 != 0;
	if is_negative {
		mantissa = 0;
	}
	if mantissa == 0 {
		return BigUint::zero();
	}
	let mantissa = BigUint::from(mantissa);
	if exponent <= 3 {
		let shift = (3 - exponent) * 8;
		mantissa >> (shift as usize)
	} else {
		let shift = (exponent - 3) * 8;
		mantissa << (shift as usize)
	}
}

/// Encodes a 256-bit target back into its compact "bits" representation.
pub fn target_to_bits(target: &BigUint) -> u32 {
	let mut bytes = target.to_bytes_be();
	// strip leading zero bytes, keep track of how many significant bytes remain
	while bytes.first() == Some(&0) {
		bytes.remove(0);
	}
	if bytes.is_empty() {
		return 0;
	}
	let mut size = bytes.len();
	// if the high bit of the first byte is set, the mantissa would be read as
	// negative; shift right a byte and bump size to compensate
	let high_bit_set = bytes[0] & 0x80 != 0;
	if high_bit_set {
		size += 1;
	}
	let take = if high_bit_set { 2 } else { 3 };
	let mut mantissa: u32 = 0;
	for (i, b) in bytes.iter().take(take).enumerate() {
		mantissa |= (*b as u32) << (8 * (take - 1 - i));
	}
	((size as u32) << 24) | mantissa
}

/// Work represented by a block: `2^256 / (target + 1)`, summed over
/// ancestors to get cumulative chain work.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Work(BigUint);

impl Work {
	/// The zero work value, i.e. the chain work of a block whose target
	/// check has not yet been accounted for.
	pub fn zero() -> Work {
		Work(BigUint::zero())
	}

	/// Work contributed by a single block with the given compact target.
	pub fn from_bits(bits: u32) -> Work {
		let target = bits_to_target(bits);
		let numerator = BigUint::from(1u32) << 256;
		Work(numerator / (target + BigUint::from(1u32)))
	}

	/// Work represented directly by a `BigUint`, for tests and storage
	/// round-trips.
	pub fn from_biguint(n: BigUint) -> Work {
		Work(n)
	}

	/// Borrow the underlying big integer.
	pub fn as_biguint(&self) -> &BigUint {
		&self.0
	}

	/// 32-byte big-endian, right-padded wire encoding, per spec.
	pub fn to_bytes(&self) -> [u8; 32] {
		let be = self.0.to_bytes_be();
		let mut out = [0u8; 32];
		if be.len() <= 32 {
			out[..be.len()].copy_from_slice(&be);
		} else {
			// astronomically large work; keep the most significant 32 bytes
			out.copy_from_slice(&be[be.len() - 32..]);
		}
		out
	}

	/// Decodes a 32-byte big-endian, right-padded work value.
	pub fn from_bytes(bytes: &[u8; 32]) -> Work {
		Work(BigUint::from_bytes_be(bytes))
	}
}

impl Add for Work {
	type Output = Work;
	fn add(self, rhs: Work) -> Work {
		Work(self.0 + rhs.0)
	}
}

impl<'a> Add<&'a Work> for Work {
	type Output = Work;
	fn add(self, rhs: &'a Work) -> Work {
		Work(self.0 + &rhs.0)
	}
}

impl fmt::Display for Work {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Writeable for Work {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_fixed_bytes(&self.to_bytes())
	}
}

impl Readable for Work {
	fn read<R: Reader>(reader: &mut R) -> Result<Work, ser::Error> {
		let bytes = reader.read_32_bytes()?;
		Ok(Work::from_bytes(&bytes))
	}
}

/// Returns true if `hash`, read as a 256-bit big-endian number, is at or
/// below the target decoded from `bits` — the block's proof-of-work
/// self-check.
pub fn meets_target(hash: &Hash, bits: u32) -> bool {
	let target = bits_to_target(bits);
	let h = BigUint::from_bytes_be(hash.as_bytes());
	h <= target
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn bits_roundtrip_simple() {
		// a typical mainnet-style compact target
		let bits = 0x1d00ffffu32;
		let target = bits_to_target(bits);
		let back = target_to_bits(&target);
		assert_eq!(bits, back);
	}

	#[test]
	fn zero_mantissa_is_zero_target() {
		assert_eq!(bits_to_target(0x04000000), BigUint::zero());
	}

	#[test]
	fn work_increases_as_target_shrinks() {
		let easy = Work::from_bits(0x1d00ffff);
		let hard = Work::from_bits(0x1c00ffff);
		assert!(hard > easy);
	}

	#[test]
	fn work_matches_two_pow_256_over_target_plus_one() {
		let bits = 0x03000001u32; // decodes to target = 1
		assert_eq!(bits_to_target(bits), BigUint::from(1u32));
		let expected = (BigUint::from(1u32) << 256) / BigUint::from(2u32); // 2^255
		assert_eq!(Work::from_bits(bits).as_biguint(), &expected);
	}

	#[test]
	fn work_round_trips_through_bytes() {
		let w = Work::from_bits(0x1b0404cb);
		let bytes = w.to_bytes();
		let w2 = Work::from_bytes(&bytes);
		assert_eq!(w, w2);
	}
}
