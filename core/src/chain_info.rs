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

//! Per-header chain metadata computed once at ingest time and then
//! persisted alongside the header it describes, so that recomputing
//! cumulative work or height never requires walking ancestors again.

use crate::ser::{self, Readable, Reader, Writeable, Writer};
use crate::target::Work;

/// Cumulative, derived facts about a header's place in the chain.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChainInfo {
	/// Total work of this header and all its ancestors.
	pub chain_work: Work,
	/// Height of this header above genesis (genesis is height 0).
	pub height: u32,
	/// Total number of transactions in this header and all its
	/// ancestors, for informational / RPC-style queries.
	pub total_chain_txs: i64,
}

impl ChainInfo {
	/// The `ChainInfo` of a genesis header: no ancestors, so chain work
	/// is exactly this header's own work.
	pub fn genesis(bits: u32, num_txs: i64) -> ChainInfo {
		ChainInfo {
			chain_work: Work::from_bits(bits),
			height: 0,
			total_chain_txs: num_txs,
		}
	}

	/// Derives the `ChainInfo` of a header extending `self` with the
	/// given compact target and transaction count.
	pub fn next(&self, bits: u32, num_txs: i64) -> ChainInfo {
		ChainInfo {
			chain_work: self.chain_work.clone() + Work::from_bits(bits),
			height: self.height + 1,
			total_chain_txs: self.total_chain_txs + num_txs,
		}
	}
}

impl Writeable for ChainInfo {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		self.chain_work.write(writer)?;
		writer.write_u32(self.height)?;
		writer.write_i64(self.total_chain_txs)?;
		Ok(())
	}
}

impl Readable for ChainInfo {
	fn read<R: Reader>(reader: &mut R) -> Result<ChainInfo, ser::Error> {
		let chain_work = Work::read(reader)?;
		let height = reader.read_u32()?;
		let total_chain_txs = reader.read_i64()?;
		Ok(ChainInfo {
			chain_work,
			height,
			total_chain_txs,
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ser::{deserialize, ser_vec};

	#[test]
	fn chain_info_record_is_44_bytes() {
		let ci = ChainInfo::genesis(0x1d00ffff, 1);
		let bytes = ser_vec(&ci).unwrap();
		assert_eq!(bytes.len(), 32 + 4 + 8);
	}

	#[test]
	fn next_accumulates_work_height_and_txs() {
		let genesis = ChainInfo::genesis(0x1d00ffff, 1);
		let next = genesis.next(0x1d00ffff, 3);
		assert_eq!(next.height, 1);
		assert_eq!(next.total_chain_txs, 4);
		assert!(next.chain_work > genesis.chain_work);
	}

	#[test]
	fn chain_info_round_trips() {
		let ci = ChainInfo::genesis(0x1b0404cb, 42).next(0x1b0404cb, 2);
		let bytes = ser_vec(&ci).unwrap();
		let mut cursor = std::io::Cursor::new(bytes);
		let back: ChainInfo = deserialize(&mut cursor).unwrap();
		assert_eq!(ci, back);
	}
}
