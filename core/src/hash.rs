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

//! Hash function
//!
//! The primary identity hash used throughout the protocol: double
//! SHA-256. Stored and compared in logical (big-endian) byte order;
//! only serialized little-endian on the wire by callers that need it.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, ErrorKind};

/// A 32-byte hash uniquely identifying a header, a stored block, or any
/// other byte-serializable construct in the chain.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Hash(pub [u8; 32]);

/// The zero hash, used as the "previous" link for a genesis header.
pub const ZERO_HASH: Hash = Hash([0; 32]);

impl Hash {
	/// Builds a Hash from a byte slice, panicking if the slice isn't
	/// exactly 32 bytes long. Callers that need a fallible conversion
	/// should use `from_slice`.
	pub fn from_vec(v: &[u8]) -> Hash {
		Hash::from_slice(v).expect("hash must be exactly 32 bytes")
	}

	/// Fallible conversion from an arbitrary-length byte slice.
	pub fn from_slice(v: &[u8]) -> Result<Hash, Error> {
		if v.len() != 32 {
			return Err(ErrorKind::InvalidHashLength(v.len()).into());
		}
		let mut a = [0u8; 32];
		a.copy_from_slice(v);
		Ok(Hash(a))
	}

	/// Borrow the hash as a byte slice, in logical (big-endian) order.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Little-endian wire encoding, as found in a serialized header's
	/// `prev_hash` field or a transaction id on the wire.
	pub fn to_bytes_le(&self) -> [u8; 32] {
		let mut out = self.0;
		out.reverse();
		out
	}

	/// Builds a Hash from its little-endian wire encoding.
	pub fn from_bytes_le(bytes: &[u8; 32]) -> Hash {
		let mut out = *bytes;
		out.reverse();
		Hash(out)
	}
}

impl Default for Hash {
	fn default() -> Hash {
		ZERO_HASH
	}
}

impl PartialOrd for Hash {
	fn partial_cmp(&self, other: &Hash) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Hash {
	fn cmp(&self, other: &Hash) -> Ordering {
		self.0.cmp(&other.0)
	}
}

impl fmt::Display for Hash {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for b in self.0.iter() {
			write!(f, "{:02x}", b)?;
		}
		Ok(())
	}
}

impl fmt::Debug for Hash {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Hash({})", self)
	}
}

impl Serialize for Hash {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Hash {
	fn deserialize<D>(deserializer: D) -> Result<Hash, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		let bytes = bsv_util::from_hex(s).map_err(|_| de::Error::custom("invalid hex hash"))?;
		Hash::from_slice(&bytes).map_err(|_| de::Error::custom("hash must be 32 bytes"))
	}
}

/// Types that derive their identity from the double-SHA-256 of their
/// canonical byte serialization.
pub trait Hashed {
	/// The double-SHA-256 hash of `self`'s serialized bytes.
	fn hash(&self) -> Hash {
		Hash(double_sha256(&self.bytes()))
	}

	/// Canonical byte serialization used to compute `hash()`.
	fn bytes(&self) -> Vec<u8>;
}

/// SHA-256(SHA-256(data)), the hash used throughout the protocol for
/// block and transaction identity.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
	let first = Sha256::digest(data);
	let second = Sha256::digest(&first);
	let mut out = [0u8; 32];
	out.copy_from_slice(&second);
	out
}

impl Hashed for [u8] {
	fn bytes(&self) -> Vec<u8> {
		self.to_owned()
	}
}
