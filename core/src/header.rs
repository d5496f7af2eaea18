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

//! The 80-byte block header: the unit the chain engine actually
//! validates and links. Bodies aren't modeled here; the chain only
//! ever deals in headers plus whatever `ChainInfo` it derives for them.

use crate::hash::{Hash, Hashed};
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// A block header, serialized little-endian in the canonical 80-byte
/// form used both on the wire and to compute the header hash.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Header {
	/// Block version, interpreted as a bitfield for soft-fork signaling
	/// by callers; opaque here.
	pub version: u32,
	/// Hash of the previous header in the chain.
	pub prev_hash: Hash,
	/// Merkle root of the block's transactions.
	pub merkle_root: Hash,
	/// Block timestamp, seconds since the Unix epoch.
	pub time: u32,
	/// Compact-encoded proof-of-work target.
	pub bits: u32,
	/// Proof-of-work nonce.
	pub nonce: u32,
}

impl Header {
	/// Builds the all-zero genesis-predecessor header, used only as a
	/// sentinel; real genesis headers are supplied by callers.
	pub fn default() -> Header {
		Header {
			version: 1,
			prev_hash: Hash::default(),
			merkle_root: Hash::default(),
			time: 0,
			bits: 0,
			nonce: 0,
		}
	}
}

impl Hashed for Header {
	fn bytes(&self) -> Vec<u8> {
		ser::ser_vec(self).expect("serializing a header cannot fail")
	}
}

impl Writeable for Header {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u32(self.version)?;
		writer.write_fixed_bytes(&self.prev_hash.to_bytes_le())?;
		writer.write_fixed_bytes(&self.merkle_root.to_bytes_le())?;
		writer.write_u32(self.time)?;
		writer.write_u32(self.bits)?;
		writer.write_u32(self.nonce)?;
		Ok(())
	}
}

impl Readable for Header {
	fn read<R: Reader>(reader: &mut R) -> Result<Header, ser::Error> {
		let version = reader.read_u32()?;
		let prev_hash = Hash::from_bytes_le(&reader.read_32_bytes()?);
		let merkle_root = Hash::from_bytes_le(&reader.read_32_bytes()?);
		let time = reader.read_u32()?;
		let bits = reader.read_u32()?;
		let nonce = reader.read_u32()?;
		Ok(Header {
			version,
			prev_hash,
			merkle_root,
			time,
			bits,
			nonce,
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ser::{deserialize, ser_vec};

	#[test]
	fn header_serializes_to_80_bytes() {
		let h = Header::default();
		let bytes = ser_vec(&h).unwrap();
		assert_eq!(bytes.len(), 80);
	}

	#[test]
	fn header_round_trips() {
		let h = Header {
			version: 2,
			prev_hash: Hash::from_vec(&[7u8; 32]),
			merkle_root: Hash::from_vec(&[9u8; 32]),
			time: 1_600_000_000,
			bits: 0x1d00ffff,
			nonce: 12345,
		};
		let bytes = ser_vec(&h).unwrap();
		let mut cursor = std::io::Cursor::new(bytes);
		let back: Header = deserialize(&mut cursor).unwrap();
		assert_eq!(h, back);
	}

	#[test]
	fn header_hash_is_stable() {
		let h = Header::default();
		let a = h.hash();
		let b = h.hash();
		assert_eq!(a, b);
	}
}
