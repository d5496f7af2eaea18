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

//! Base types the chain pipeline is built from: the store and
//! rule-checker interfaces it consumes, the listener/executor model it
//! exposes, and the bitflags that shape a single `add` call.

use bsv_core::StoredBlock;

use crate::error::Error;

bitflags! {
	/// Per-call options threaded through the ingest pipeline.
	pub struct Options: u32 {
		/// No special handling.
		const NONE = 0b0000_0001;
		/// Bulk ingest (initial sync): suppress the side effects a
		/// caller would not want fired once per block during a fast
		/// catch-up, such as broadcasting accepted blocks.
		const SYNC = 0b0000_0010;
		/// Test support: skip the proof-of-work self-check. Never set
		/// by the engine itself.
		const SKIP_POW = 0b0000_0100;
	}
}

/// The abstract block store the chain engine consumes. Implementations
/// must be safe for concurrent readers; writes are only ever issued
/// while the engine holds its exclusive ingest lock.
pub trait BlockStore: Send + Sync {
	/// Looks up a previously-persisted block by its header hash.
	fn get(&self, hash: &bsv_core::Hash) -> Result<Option<StoredBlock>, Error>;

	/// Looks up the parent of `block`, if it too is in the store.
	fn prev(&self, block: &StoredBlock) -> Result<Option<StoredBlock>, Error> {
		self.get(&block.prev_hash())
	}

	/// Persists `block`. Must be durable before returning `Ok`.
	fn put(&self, block: StoredBlock) -> Result<(), Error>;

	/// The block currently considered the chain head.
	fn chain_head(&self) -> Result<StoredBlock, Error>;

	/// Updates the chain head pointer. Does not imply `put`; callers
	/// must have already persisted `block`.
	fn set_chain_head(&self, block: StoredBlock) -> Result<(), Error>;

	/// Rolls the store back to `height`, discarding anything above it.
	/// Only SPV-style stores are expected to support this; others
	/// should return `ErrorKind::Unsupported`.
	fn rollback(&self, _height: u32) -> Result<(), Error> {
		Err(crate::error::ErrorKind::Unsupported("rollback".to_owned()).into())
	}

	/// Called when a verification failure means a candidate's writes
	/// must not become the new chain head; an abort hook for
	/// transactional stores. The default is a no-op.
	fn not_setting_chain_head(&self) {}
}

/// Network-rule checker for a single candidate, built by a
/// [`RuleCheckerFactory`]. Encodes retarget policy, fork-activation
/// heights, and anything else context-dependent that the engine itself
/// is deliberately agnostic to.
pub trait RuleChecker: Send + Sync {
	/// Validates `candidate` against `parent` and whatever ancestor
	/// state it needs to read from `store`. Raises on violation.
	fn check(
		&self,
		parent: &StoredBlock,
		candidate: &StoredBlock,
		store: &dyn BlockStore,
	) -> Result<(), Error>;
}

/// Builds the [`RuleChecker`] to use for a given parent/candidate pair,
/// so network parameters that vary by height (retarget epoch,
/// fork-activation) can be baked into the checker instance itself.
pub trait RuleCheckerFactory: Send + Sync {
	/// Builds the checker for this parent/candidate pair.
	fn rule_checker(
		&self,
		parent: &StoredBlock,
		candidate: &StoredBlock,
	) -> Box<dyn RuleChecker>;
}

/// An abstraction over "run this unit of work", so listener callbacks
/// can be scheduled inline or handed off to a caller-supplied executor
/// (a thread pool, an async runtime, whatever the embedding
/// application already runs).
pub trait Executor: Send + Sync {
	/// Runs `job`, synchronously or by scheduling it elsewhere.
	fn execute(&self, job: Box<dyn FnOnce() + Send>);

	/// Whether this executor runs inline on the calling thread. The
	/// engine uses this to decide whether a listener panic should
	/// propagate to the `add` caller (`true`) or be caught and logged
	/// (`false`). Only [`SameThreadExecutor`] answers `true`.
	fn is_inline(&self) -> bool {
		false
	}
}

/// The distinguished inline executor: runs the job synchronously on
/// the calling (ingesting) thread. Exceptions raised by a listener
/// registered with this executor propagate to the `add` caller;
/// exceptions on any other executor are logged and swallowed.
pub struct SameThreadExecutor;

impl Executor for SameThreadExecutor {
	fn execute(&self, job: Box<dyn FnOnce() + Send>) {
		job()
	}

	fn is_inline(&self) -> bool {
		true
	}
}

/// Outcome of a single `add` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
	/// The candidate was validated and persisted, whether or not it
	/// became (or extended) the chain head.
	Accepted,
	/// The candidate's parent isn't in the store yet; it was placed in
	/// the orphan pool and will be retried automatically once its
	/// parent connects.
	Orphaned,
}
