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

//! Facade for the chain engine: header ingestion, the orphan pool,
//! fork tracking and reorganization, and listener notification. A
//! single staged, header-only pipeline sits in front of a pluggable
//! store and rule checker.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::debug;

use bsv_core::{consensus, ChainInfo, Hash, Hashed, StoredBlock};
use bsv_util::{Mutex, RwLock};

use crate::error::{Error, ErrorKind};
use crate::pipe::{self, VersionTally};
use crate::promise::{self, HeightFuture};
use crate::types::{AddResult, BlockStore, Executor, Options, RuleCheckerFactory};

/// Bound on the orphan pool: once full, the highest (and therefore
/// least useful to keep around) orphan is evicted to make room. Guards
/// against unbounded memory growth from a peer feeding disconnected
/// blocks.
const MAX_ORPHANS: usize = 100;

struct OrphanEntry {
	block: StoredBlock,
	opts: Options,
}

/// In-memory pool of blocks whose parent isn't (yet) in the store.
struct OrphanBlockPool {
	by_hash: RwLock<HashMap<Hash, OrphanEntry>>,
	by_prev: RwLock<HashMap<Hash, Hash>>,
}

impl OrphanBlockPool {
	fn new() -> OrphanBlockPool {
		OrphanBlockPool {
			by_hash: RwLock::new(HashMap::new()),
			by_prev: RwLock::new(HashMap::new()),
		}
	}

	fn len(&self) -> usize {
		self.by_hash.read().len()
	}

	fn contains(&self, hash: &Hash) -> bool {
		self.by_hash.read().contains_key(hash)
	}

	fn get(&self, hash: &Hash) -> Option<StoredBlock> {
		self.by_hash.read().get(hash).map(|e| e.block.clone())
	}

	fn all(&self) -> Vec<StoredBlock> {
		self.by_hash.read().values().map(|e| e.block.clone()).collect()
	}

	fn add(&self, block: StoredBlock, opts: Options) {
		let hash = block.hash();
		let prev = block.prev_hash();
		{
			let mut by_hash = self.by_hash.write();
			let mut by_prev = self.by_prev.write();
			by_hash.insert(hash, OrphanEntry { block, opts });
			by_prev.insert(prev, hash);
		}
		if self.len() > MAX_ORPHANS {
			let highest = {
				let by_hash = self.by_hash.read();
				by_hash
					.values()
					.max_by_key(|e| e.block.height())
					.map(|e| e.block.hash())
			};
			if let Some(h) = highest {
				self.remove(&h);
			}
		}
	}

	fn remove(&self, hash: &Hash) -> Option<(StoredBlock, Options)> {
		let mut by_hash = self.by_hash.write();
		let mut by_prev = self.by_prev.write();
		let entry = by_hash.remove(hash)?;
		by_prev.remove(&entry.block.prev_hash());
		Some((entry.block, entry.opts))
	}

	/// Removes and returns every orphan hash currently held.
	fn drain(&self) -> std::collections::HashSet<Hash> {
		let mut by_hash = self.by_hash.write();
		let mut by_prev = self.by_prev.write();
		let hashes: std::collections::HashSet<Hash> = by_hash.keys().cloned().collect();
		by_hash.clear();
		by_prev.clear();
		hashes
	}
}

struct NewBestBlockEntry {
	id: usize,
	executor: Arc<dyn Executor>,
	callback: Box<dyn Fn(&ChainInfo) + Send + Sync>,
}

struct ReorganizeEntry {
	id: usize,
	executor: Arc<dyn Executor>,
	callback: Box<dyn Fn(&StoredBlock, &[StoredBlock], &[StoredBlock]) + Send + Sync>,
}

/// The chain engine: ingests candidate headers, links them against a
/// caller-supplied [`BlockStore`], tracks the best chain by cumulative
/// work, and notifies registered listeners of new heads and
/// reorganizations.
pub struct Chain {
	store: Arc<dyn BlockStore>,
	rule_factory: Arc<dyn RuleCheckerFactory>,
	checkpoints: HashMap<u32, Hash>,

	/// Serializes all `add`/orphan/reorg activity. Held for the
	/// duration of a single `add` call (including its recursive
	/// orphan-promotion follow-up).
	ingest_lock: Mutex<()>,
	/// Lightweight publication lock so readers never observe a torn
	/// head while a reorg is in progress.
	head: RwLock<StoredBlock>,

	orphans: OrphanBlockPool,
	version_tally: Mutex<VersionTally>,
	height_waiters: Mutex<Vec<(u32, promise::HeightPromise)>>,

	new_best_listeners: ArcSwap<Vec<Arc<NewBestBlockEntry>>>,
	reorganize_listeners: ArcSwap<Vec<Arc<ReorganizeEntry>>>,
	listener_registration_lock: Mutex<()>,
	next_listener_id: AtomicUsize,
}

impl Chain {
	/// Builds a new engine over `store`, already seeded with a genesis
	/// block, validating future candidates with `rule_factory` and,
	/// optionally, a fixed set of height-pinned checkpoints.
	pub fn new(
		store: Arc<dyn BlockStore>,
		rule_factory: Arc<dyn RuleCheckerFactory>,
		checkpoints: HashMap<u32, Hash>,
	) -> Result<Chain, Error> {
		let head = store
			.chain_head()
			.map_err(|_| ErrorKind::StoreError("store has no chain head".to_owned()))?;
		Ok(Chain {
			store,
			rule_factory,
			checkpoints,
			ingest_lock: Mutex::new(()),
			head: RwLock::new(head),
			orphans: OrphanBlockPool::new(),
			version_tally: Mutex::new(VersionTally::new()),
			height_waiters: Mutex::new(Vec::new()),
			new_best_listeners: ArcSwap::from_pointee(Vec::new()),
			reorganize_listeners: ArcSwap::from_pointee(Vec::new()),
			listener_registration_lock: Mutex::new(()),
			next_listener_id: AtomicUsize::new(1),
		})
	}

	/// Ingests `candidate`. See the module-level docs for the full
	/// algorithm; in short: accepts a repeat of the current head
	/// idempotently, orphans anything whose parent is missing, rejects
	/// anything that fails its header self-check or the pluggable
	/// `RuleChecker`, and otherwise connects it — extending the head,
	/// growing a side branch, or triggering a reorganization if the
	/// side branch just overtook the head's cumulative work.
	pub fn add(&self, candidate: StoredBlock) -> Result<AddResult, Error> {
		self.add_internal(candidate, Options::NONE, true)
	}

	/// Ingests `candidate` as `add` does, but under caller-supplied
	/// `opts` (e.g. `Options::SYNC` during initial block download, or
	/// `Options::SKIP_POW` in tests that mint headers without mining
	/// them).
	pub fn add_with_options(&self, candidate: StoredBlock, opts: Options) -> Result<AddResult, Error> {
		self.add_internal(candidate, opts, true)
	}

	fn add_internal(
		&self,
		candidate: StoredBlock,
		opts: Options,
		try_connecting: bool,
	) -> Result<AddResult, Error> {
		let _guard = self.ingest_lock.lock();
		let candidate_hash = candidate.hash();
		let head = self.chain_head();

		if candidate_hash == head.hash() {
			return Ok(AddResult::Accepted);
		}

		if try_connecting && self.orphans.contains(&candidate_hash) {
			return Ok(AddResult::Orphaned);
		}

		// Idempotence: re-adding a block already durably stored (main
		// chain or side branch) is a no-op, not a second connect.
		if self.store.get(&candidate_hash)?.is_some() {
			debug!("add: {} already in store, ignoring", candidate_hash);
			return Ok(AddResult::Accepted);
		}

		pipe::header_self_check(&candidate.header, opts).map_err(|e| {
			self.store.not_setting_chain_head();
			e
		})?;

		let parent = match self.store.get(&candidate.prev_hash())? {
			Some(p) => p,
			None => {
				self.orphans.add(candidate, opts);
				return Ok(AddResult::Orphaned);
			}
		};

		let checker = self.rule_factory.rule_checker(&parent, &candidate);
		checker
			.check(&parent, &candidate, self.store.as_ref())
			.map_err(|e| {
				self.store.not_setting_chain_head();
				e
			})?;

		if parent.hash() == head.hash() {
			pipe::check_checkpoint(candidate.height(), candidate_hash, &self.checkpoints).map_err(|e| {
				self.store.not_setting_chain_head();
				e
			})?;

			let recent = self.recent_timestamps(&head, consensus::MEDIAN_TIME_SPAN)?;
			pipe::check_median_time_past(candidate.header.time, &recent).map_err(|e| {
				self.store.not_setting_chain_head();
				e
			})?;

			{
				let mut tally = self.version_tally.lock();
				pipe::check_supermajority(&tally, candidate.header.version, head.header.version).map_err(|e| {
					self.store.not_setting_chain_head();
					e
				})?;
				tally.push(candidate.header.version);
			}

			self.store.put(candidate.clone())?;
			self.store.set_chain_head(candidate.clone())?;
			self.set_head(candidate.clone());
			self.fire_new_best_block(&candidate);
			self.fulfill_height_waiters(&candidate);
		} else if candidate.chain_work() > head.chain_work() {
			self.store.put(candidate.clone())?;
			self.handle_new_best_chain(candidate.clone(), head)?;
			self.fulfill_height_waiters(&candidate);
		} else {
			self.store.put(candidate.clone())?;
			debug!(
				"add: {} connected to a side branch at height {}",
				candidate_hash,
				candidate.height()
			);
		}

		if try_connecting {
			self.try_connect_orphans();
		}

		Ok(AddResult::Accepted)
	}

	/// Repeatedly scans the orphan pool connecting any orphan whose
	/// parent now exists in the store, stopping once a full pass
	/// promotes nothing.
	fn try_connect_orphans(&self) {
		loop {
			let connectable = self
				.orphans
				.all()
				.into_iter()
				.find(|b| matches!(self.store.get(&b.prev_hash()), Ok(Some(_))));

			let block = match connectable {
				Some(b) => b,
				None => break,
			};

			let (block, opts) = match self.orphans.remove(&block.hash()) {
				Some(entry) => entry,
				None => continue,
			};
			let _ = self.add_internal(block, opts, false);
		}
	}

	/// Performs a reorganization from `old_head` to `new_head`,
	/// notifying reorganize listeners with the split point and the two
	/// tip-to-split (split excluded) chains.
	fn handle_new_best_chain(&self, new_head: StoredBlock, old_head: StoredBlock) -> Result<(), Error> {
		let split = self.find_split(&new_head, &old_head)?;

		if split.hash() == new_head.hash() {
			debug!("handle_new_best_chain: {} already on main chain", new_head.hash());
			return Ok(());
		}

		let old_blocks = self.collect_down_to(&old_head, &split)?;
		let new_blocks = self.collect_down_to(&new_head, &split)?;

		self.store.set_chain_head(new_head.clone())?;
		self.fire_reorganize(&split, &old_blocks, &new_blocks);
		self.set_head(new_head);

		Ok(())
	}

	/// Walks both cursors backward, always retreating the deeper one,
	/// until they meet at their most recent common ancestor.
	fn find_split(&self, a: &StoredBlock, b: &StoredBlock) -> Result<StoredBlock, Error> {
		let mut a = a.clone();
		let mut b = b.clone();
		while a.hash() != b.hash() {
			if a.height() > b.height() {
				a = self.must_prev(&a)?;
			} else if b.height() > a.height() {
				b = self.must_prev(&b)?;
			} else {
				a = self.must_prev(&a)?;
				b = self.must_prev(&b)?;
			}
		}
		Ok(a)
	}

	fn must_prev(&self, block: &StoredBlock) -> Result<StoredBlock, Error> {
		self.store
			.prev(block)?
			.ok_or_else(|| ErrorKind::VerificationError("orphan chain".to_owned()).into())
	}

	/// Ancestors of `tip` down to (but excluding) `split`, tip first.
	fn collect_down_to(&self, tip: &StoredBlock, split: &StoredBlock) -> Result<Vec<StoredBlock>, Error> {
		let mut out = Vec::new();
		let mut cur = tip.clone();
		while cur.hash() != split.hash() {
			let next = self.must_prev(&cur)?;
			out.push(cur);
			cur = next;
		}
		Ok(out)
	}

	fn recent_timestamps(&self, head: &StoredBlock, span: usize) -> Result<Vec<u32>, Error> {
		let mut timestamps = Vec::with_capacity(span);
		let mut cur = head.clone();
		timestamps.push(cur.header.time);
		for _ in 1..span {
			match self.store.prev(&cur)? {
				Some(prev) => {
					timestamps.push(prev.header.time);
					cur = prev;
				}
				None => break,
			}
		}
		Ok(timestamps)
	}

	fn set_head(&self, block: StoredBlock) {
		*self.head.write() = block;
	}

	/// Atomically drains and returns every orphan hash currently held.
	pub fn drain_orphans(&self) -> std::collections::HashSet<Hash> {
		self.orphans.drain()
	}

	/// Walks backward through the orphan pool from `h`, returning the
	/// deepest ancestor that is itself still an orphan (i.e. the root
	/// of the orphan chain `h` belongs to), or `None` if `h` isn't an
	/// orphan at all.
	pub fn orphan_root(&self, h: &Hash) -> Option<StoredBlock> {
		let mut current = self.orphans.get(h)?;
		loop {
			match self.orphans.get(&current.prev_hash()) {
				Some(parent) => current = parent,
				None => return Some(current),
			}
		}
	}

	/// Whether `h` is currently held in the orphan pool.
	pub fn is_orphan(&self, h: &Hash) -> bool {
		self.orphans.contains(h)
	}

	/// The current chain head.
	pub fn chain_head(&self) -> StoredBlock {
		self.head.read().clone()
	}

	/// Height of the current chain head.
	pub fn best_height(&self) -> u32 {
		self.head.read().height()
	}

	/// Linear extrapolation of the timestamp at `height` from the
	/// current head at the network's target block spacing. Past
	/// heights are extrapolated, not looked up in the store.
	pub fn estimate_block_time(&self, height: u32) -> u32 {
		let head = self.chain_head();
		let delta = height as i64 - head.height() as i64;
		let estimate = head.header.time as i64 + delta * consensus::TARGET_SPACING_SECS as i64;
		estimate.max(0) as u32
	}

	/// A future that completes with the `StoredBlock` that first
	/// brings the chain head to or beyond `target_height`, on whichever
	/// thread's `add` call causes that to happen. Already-reached
	/// heights complete immediately.
	pub fn height_future(&self, target_height: u32) -> HeightFuture {
		let head = self.chain_head();
		let (promise, future) = promise::height_promise();
		if head.height() >= target_height {
			promise.fulfill(head);
		} else {
			self.height_waiters.lock().push((target_height, promise));
		}
		future
	}

	fn fulfill_height_waiters(&self, block: &StoredBlock) {
		let mut waiters = self.height_waiters.lock();
		let height = block.height();
		let mut remaining = Vec::with_capacity(waiters.len());
		for (target, promise) in waiters.drain(..) {
			if height >= target {
				promise.fulfill(block.clone());
			} else {
				remaining.push((target, promise));
			}
		}
		*waiters = remaining;
	}

	/// Registers a callback fired on every head advance that extends
	/// the current chain (not a reorg). Returns an id usable with
	/// [`Chain::remove_new_best_block_listener`].
	pub fn add_new_best_block_listener(
		&self,
		executor: Arc<dyn Executor>,
		callback: Box<dyn Fn(&ChainInfo) + Send + Sync>,
	) -> usize {
		let _guard = self.listener_registration_lock.lock();
		let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
		let mut list = (**self.new_best_listeners.load()).clone();
		list.push(Arc::new(NewBestBlockEntry { id, executor, callback }));
		self.new_best_listeners.store(Arc::new(list));
		id
	}

	/// Removes a previously-registered new-best-block listener.
	pub fn remove_new_best_block_listener(&self, id: usize) {
		let _guard = self.listener_registration_lock.lock();
		let list: Vec<_> = self
			.new_best_listeners
			.load()
			.iter()
			.filter(|e| e.id != id)
			.cloned()
			.collect();
		self.new_best_listeners.store(Arc::new(list));
	}

	/// Registers a callback fired once per reorganization, receiving
	/// the split point and the two tip-to-split (split excluded)
	/// chains, old first.
	pub fn add_reorganize_listener(
		&self,
		executor: Arc<dyn Executor>,
		callback: Box<dyn Fn(&StoredBlock, &[StoredBlock], &[StoredBlock]) + Send + Sync>,
	) -> usize {
		let _guard = self.listener_registration_lock.lock();
		let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
		let mut list = (**self.reorganize_listeners.load()).clone();
		list.push(Arc::new(ReorganizeEntry { id, executor, callback }));
		self.reorganize_listeners.store(Arc::new(list));
		id
	}

	/// Removes a previously-registered reorganize listener.
	pub fn remove_reorganize_listener(&self, id: usize) {
		let _guard = self.listener_registration_lock.lock();
		let list: Vec<_> = self
			.reorganize_listeners
			.load()
			.iter()
			.filter(|e| e.id != id)
			.cloned()
			.collect();
		self.reorganize_listeners.store(Arc::new(list));
	}

	fn fire_new_best_block(&self, block: &StoredBlock) {
		let listeners = self.new_best_listeners.load();
		for entry in listeners.iter() {
			let entry = entry.clone();
			let info = block.info.clone();
			dispatch(entry.executor.as_ref(), entry.executor.is_inline(), move || {
				(entry.callback)(&info)
			});
		}
	}

	fn fire_reorganize(&self, split: &StoredBlock, old_blocks: &[StoredBlock], new_blocks: &[StoredBlock]) {
		let listeners = self.reorganize_listeners.load();
		for entry in listeners.iter() {
			let entry = entry.clone();
			let split = split.clone();
			let old_blocks = old_blocks.to_vec();
			let new_blocks = new_blocks.to_vec();
			dispatch(entry.executor.as_ref(), entry.executor.is_inline(), move || {
				(entry.callback)(&split, &old_blocks, &new_blocks)
			});
		}
	}
}

/// Runs `job` on `executor`. On the inline executor a panic propagates
/// to the caller; on any other executor it's caught and logged.
fn dispatch<F: FnOnce() + Send + 'static>(executor: &dyn Executor, inline: bool, job: F) {
	if inline {
		executor.execute(Box::new(job));
	} else {
		executor.execute(Box::new(move || {
			if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
				log::error!("listener callback panicked; swallowed (non-inline executor)");
			}
		}));
	}
}
