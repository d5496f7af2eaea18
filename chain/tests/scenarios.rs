//! End-to-end scenarios against a `Chain` wired up with a
//! `MemoryBlockStore` and a pass-through rule checker, exercising the
//! ingest, orphan-promotion, reorganization and idempotence behaviors
//! called out as testable properties.
//!
//! All blocks are ingested under `Options::SKIP_POW`: the header
//! self-check's proof-of-work verification is exercised directly in
//! `bsv_core::target`'s own unit tests, and here we only want headers
//! whose *acceptance* is deterministic, not dependent on whether an
//! arbitrary nonce happens to produce a hash under some target.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bsv_chain::test_support::PassthroughRuleCheckerFactory;
use bsv_chain::{AddResult, Chain, MemoryBlockStore, Options, SameThreadExecutor};
use bsv_core::{ChainInfo, Hash, Hashed, Header, StoredBlock};
use bsv_util::Mutex;

/// A typical mainnet-style compact target; the exact value doesn't
/// matter here since PoW is skipped, only that every block shares it
/// so cumulative work is directly proportional to block count.
const BITS: u32 = 0x1d00_ffff;

/// A harder target at the same exponent as `BITS` but a smaller
/// mantissa: roughly 1.45x the per-block work of `BITS`. Two blocks at
/// this target (~2.9x) outweigh two blocks at `BITS` (2x), while one
/// block at this target (~1.45x) still trails three blocks at `BITS`
/// (3x) — exactly the margin the reorg scenario below needs.
const HARD_BITS: u32 = 0x1d00_b000;

fn genesis() -> StoredBlock {
	let header = Header {
		version: 1,
		prev_hash: Default::default(),
		merkle_root: Default::default(),
		time: 1_600_000_000,
		bits: BITS,
		nonce: 0,
	};
	StoredBlock::genesis(header, 1)
}

fn child_with_bits(parent: &StoredBlock, nonce: u32, bits: u32) -> StoredBlock {
	let header = Header {
		version: 1,
		prev_hash: parent.hash(),
		merkle_root: Default::default(),
		time: parent.header.time + 600,
		bits,
		nonce,
	};
	StoredBlock::next(parent, header, 1)
}

fn child(parent: &StoredBlock, nonce: u32) -> StoredBlock {
	child_with_bits(parent, nonce, BITS)
}

fn new_chain(g: StoredBlock) -> Chain {
	let store = Arc::new(MemoryBlockStore::new(g));
	Chain::new(store, Arc::new(PassthroughRuleCheckerFactory), Default::default()).unwrap()
}

fn add(chain: &Chain, block: StoredBlock) -> AddResult {
	chain.add_with_options(block, Options::SKIP_POW).unwrap()
}

#[test]
fn linear_extension_advances_head_and_fires_listener() {
	bsv_util::init_test_logger();

	let g = genesis();
	let chain = new_chain(g.clone());

	let heights: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
	let heights_clone = heights.clone();
	chain.add_new_best_block_listener(
		Arc::new(SameThreadExecutor),
		Box::new(move |info: &ChainInfo| {
			heights_clone.lock().push(info.height);
		}),
	);

	let b1 = child(&g, 1);
	assert_eq!(add(&chain, b1.clone()), AddResult::Accepted);
	assert_eq!(chain.chain_head().hash(), b1.hash());
	assert_eq!(chain.best_height(), 1);
	assert_eq!(*heights.lock(), vec![1]);
}

#[test]
fn orphan_then_parent_promotes_in_order_without_reorg() {
	bsv_util::init_test_logger();

	let g = genesis();
	let chain = new_chain(g.clone());

	let new_best_heights: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
	let new_best_clone = new_best_heights.clone();
	chain.add_new_best_block_listener(
		Arc::new(SameThreadExecutor),
		Box::new(move |info: &ChainInfo| {
			new_best_clone.lock().push(info.height);
		}),
	);

	let reorg_calls = Arc::new(AtomicUsize::new(0));
	let reorg_calls_clone = reorg_calls.clone();
	chain.add_reorganize_listener(
		Arc::new(SameThreadExecutor),
		Box::new(move |_split, _old, _new| {
			reorg_calls_clone.fetch_add(1, Ordering::SeqCst);
		}),
	);

	let b1 = child(&g, 1);
	let b2 = child(&b1, 1);

	assert_eq!(add(&chain, b2.clone()), AddResult::Orphaned);
	assert!(chain.is_orphan(&b2.hash()));
	assert_eq!(chain.chain_head().hash(), g.hash());

	assert_eq!(add(&chain, b1.clone()), AddResult::Accepted);
	assert_eq!(chain.chain_head().hash(), b2.hash());
	assert!(!chain.is_orphan(&b2.hash()));

	assert_eq!(*new_best_heights.lock(), vec![1, 2]);
	assert_eq!(reorg_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn reorg_of_depth_two_fires_with_exact_split_and_chains() {
	bsv_util::init_test_logger();

	let g = genesis();
	let chain = new_chain(g.clone());

	let reorgs: Arc<Mutex<Vec<(Hash, Vec<Hash>, Vec<Hash>)>>> = Arc::new(Mutex::new(Vec::new()));
	let reorgs_clone = reorgs.clone();
	chain.add_reorganize_listener(
		Arc::new(SameThreadExecutor),
		Box::new(move |split, old, new| {
			reorgs_clone.lock().push((
				split.hash(),
				old.iter().map(|b| b.hash()).collect(),
				new.iter().map(|b| b.hash()).collect(),
			));
		}),
	);

	// main chain: genesis -> a -> b -> c, all at the easier target.
	let a = child(&g, 1);
	assert_eq!(add(&chain, a.clone()), AddResult::Accepted);
	let b = child(&a, 1);
	assert_eq!(add(&chain, b.clone()), AddResult::Accepted);
	let c = child(&b, 1);
	assert_eq!(add(&chain, c.clone()), AddResult::Accepted);
	assert_eq!(chain.chain_head().hash(), c.hash());

	// side chain off `a`, at the harder target: d alone still trails
	// c's cumulative work.
	let d = child_with_bits(&a, 2, HARD_BITS);
	assert_eq!(add(&chain, d.clone()), AddResult::Accepted);
	assert_eq!(chain.chain_head().hash(), c.hash());
	assert!(reorgs.lock().is_empty());

	// e extends d, at the harder target again: the side chain's
	// cumulative work now exceeds c's, triggering the reorg.
	let e = child_with_bits(&d, 1, HARD_BITS);
	assert_eq!(add(&chain, e.clone()), AddResult::Accepted);
	assert_eq!(chain.chain_head().hash(), e.hash());

	let fired = reorgs.lock();
	assert_eq!(fired.len(), 1);
	let (split, old, new) = &fired[0];
	assert_eq!(*split, a.hash());
	assert_eq!(old, &vec![c.hash(), b.hash()]);
	assert_eq!(new, &vec![e.hash(), d.hash()]);
}

#[test]
fn duplicate_add_of_head_is_a_no_op_accept() {
	bsv_util::init_test_logger();

	let g = genesis();
	let chain = new_chain(g.clone());

	let calls = Arc::new(AtomicUsize::new(0));
	let calls_clone = calls.clone();
	chain.add_new_best_block_listener(
		Arc::new(SameThreadExecutor),
		Box::new(move |_| {
			calls_clone.fetch_add(1, Ordering::SeqCst);
		}),
	);

	let c = child(&g, 1);
	assert_eq!(add(&chain, c.clone()), AddResult::Accepted);
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	assert_eq!(add(&chain, c.clone()), AddResult::Accepted);
	assert_eq!(chain.chain_head().hash(), c.hash());
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}
