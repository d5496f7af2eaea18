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

//! An in-memory [`BlockStore`] implementation. Not a production store —
//! persistence is left to the embedding application — but a reference a
//! caller can wire up directly for testing, and a model for how a real
//! (disk-backed) store should behave.

use std::collections::HashMap;

use bsv_core::{Hash, Hashed, StoredBlock};
use bsv_util::RwLock;

use crate::error::{Error, ErrorKind};
use crate::types::BlockStore;

/// A `BlockStore` backed by an in-memory map, seeded with a genesis
/// block at construction.
pub struct MemoryBlockStore {
	blocks: RwLock<HashMap<Hash, StoredBlock>>,
	head: RwLock<Hash>,
}

impl MemoryBlockStore {
	/// Builds a store containing only `genesis`, which also becomes the
	/// initial chain head.
	pub fn new(genesis: StoredBlock) -> MemoryBlockStore {
		let hash = genesis.hash();
		let mut blocks = HashMap::new();
		blocks.insert(hash, genesis);
		MemoryBlockStore {
			blocks: RwLock::new(blocks),
			head: RwLock::new(hash),
		}
	}

	/// Number of blocks currently held, for test assertions.
	pub fn len(&self) -> usize {
		self.blocks.read().len()
	}
}

impl BlockStore for MemoryBlockStore {
	fn get(&self, hash: &Hash) -> Result<Option<StoredBlock>, Error> {
		Ok(self.blocks.read().get(hash).cloned())
	}

	fn put(&self, block: StoredBlock) -> Result<(), Error> {
		let hash = block.hash();
		self.blocks.write().insert(hash, block);
		Ok(())
	}

	fn chain_head(&self) -> Result<StoredBlock, Error> {
		let hash = *self.head.read();
		self.blocks
			.read()
			.get(&hash)
			.cloned()
			.ok_or_else(|| ErrorKind::StoreError("chain head missing from store".to_owned()).into())
	}

	fn set_chain_head(&self, block: StoredBlock) -> Result<(), Error> {
		*self.head.write() = block.hash();
		Ok(())
	}
}

/// Test and reference-implementation helpers: a pass-through
/// `RuleChecker` that accepts every candidate, for exercising the
/// engine's own ingest/reorg logic in isolation from any particular
/// network's consensus rules.
pub mod test_support {
	use bsv_core::StoredBlock;

	use crate::error::Error;
	use crate::types::{BlockStore, RuleChecker, RuleCheckerFactory};

	/// A `RuleChecker` that never rejects a candidate.
	pub struct PassthroughRuleChecker;

	impl RuleChecker for PassthroughRuleChecker {
		fn check(
			&self,
			_parent: &StoredBlock,
			_candidate: &StoredBlock,
			_store: &dyn BlockStore,
		) -> Result<(), Error> {
			Ok(())
		}
	}

	/// A `RuleCheckerFactory` that always hands back a
	/// [`PassthroughRuleChecker`].
	pub struct PassthroughRuleCheckerFactory;

	impl RuleCheckerFactory for PassthroughRuleCheckerFactory {
		fn rule_checker(
			&self,
			_parent: &StoredBlock,
			_candidate: &StoredBlock,
		) -> Box<dyn RuleChecker> {
			Box::new(PassthroughRuleChecker)
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use bsv_core::Header;

	fn genesis() -> StoredBlock {
		StoredBlock::genesis(Header::default(), 1)
	}

	#[test]
	fn stores_and_retrieves_genesis() {
		let g = genesis();
		let store = MemoryBlockStore::new(g.clone());
		assert_eq!(store.get(&g.hash()).unwrap(), Some(g.clone()));
		assert_eq!(store.chain_head().unwrap(), g);
	}

	#[test]
	fn put_and_set_head_updates_lookups() {
		let g = genesis();
		let store = MemoryBlockStore::new(g.clone());
		let mut header = Header::default();
		header.prev_hash = g.hash();
		header.nonce = 1;
		let next = StoredBlock::next(&g, header, 1);
		store.put(next.clone()).unwrap();
		store.set_chain_head(next.clone()).unwrap();
		assert_eq!(store.chain_head().unwrap(), next);
		assert_eq!(store.len(), 2);
	}
}
