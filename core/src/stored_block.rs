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

//! The record the chain engine actually persists for every accepted
//! header: the header itself plus the `ChainInfo` derived for it.

use crate::chain_info::ChainInfo;
use crate::hash::{Hash, Hashed};
use crate::header::Header;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// A header together with the chain metadata computed for it at
/// ingest time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StoredBlock {
	/// The header.
	pub header: Header,
	/// Chain metadata derived for `header`.
	pub info: ChainInfo,
}

impl StoredBlock {
	/// Builds a genesis `StoredBlock` from its header and transaction
	/// count.
	pub fn genesis(header: Header, num_txs: i64) -> StoredBlock {
		let info = ChainInfo::genesis(header.bits, num_txs);
		StoredBlock { header, info }
	}

	/// Builds the `StoredBlock` for a header extending `parent`.
	pub fn next(parent: &StoredBlock, header: Header, num_txs: i64) -> StoredBlock {
		let info = parent.info.next(header.bits, num_txs);
		StoredBlock { header, info }
	}

	/// This block's height.
	pub fn height(&self) -> u32 {
		self.info.height
	}

	/// This block's cumulative chain work.
	pub fn chain_work(&self) -> &crate::target::Work {
		&self.info.chain_work
	}

	/// Hash of the previous header.
	pub fn prev_hash(&self) -> Hash {
		self.header.prev_hash
	}
}

impl Hashed for StoredBlock {
	fn bytes(&self) -> Vec<u8> {
		self.header.bytes()
	}
}

impl Writeable for StoredBlock {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		self.header.write(writer)?;
		self.info.write(writer)
	}
}

impl Readable for StoredBlock {
	fn read<R: Reader>(reader: &mut R) -> Result<StoredBlock, ser::Error> {
		let header = Header::read(reader)?;
		let info = ChainInfo::read(reader)?;
		Ok(StoredBlock { header, info })
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn genesis_has_height_zero() {
		let sb = StoredBlock::genesis(Header::default(), 1);
		assert_eq!(sb.height(), 0);
	}

	#[test]
	fn next_increments_height() {
		let genesis = StoredBlock::genesis(Header::default(), 1);
		let mut next_header = Header::default();
		next_header.prev_hash = genesis.hash();
		next_header.nonce = 1;
		let next = StoredBlock::next(&genesis, next_header, 1);
		assert_eq!(next.height(), 1);
		assert_eq!(next.prev_hash(), genesis.hash());
	}
}
