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

//! The per-candidate validation stages `Chain::add` runs before it
//! decides how to connect a block: the context-dependent checks that
//! sit alongside (but are not part of) the pluggable `RuleChecker` —
//! the header self-check, checkpoints, median-time-past, and the
//! version-supermajority tally.

use std::collections::{HashMap, VecDeque};

use bsv_core::{consensus, target, Hash};

use crate::error::{Error, ErrorKind};
use crate::types::Options;

/// Header self-check: proof-of-work must meet its own advertised
/// target, and that target must fall within the range the network
/// allows (never easier than the minimum difficulty floor). Skipped
/// entirely under `Options::SKIP_POW`, a test-only escape hatch the
/// engine never sets on its own.
pub fn header_self_check(
	header: &bsv_core::Header,
	opts: Options,
) -> Result<(), Error> {
	use bsv_core::Hashed;

	let decoded = target::bits_to_target(header.bits);
	if decoded.eq(&num_bigint::BigUint::from(0u32)) || decoded > target::max_target() {
		return Err(ErrorKind::HeaderInvalid(format!(
			"bits {:#x} decode to a target outside the allowed range",
			header.bits
		))
		.into());
	}

	if !opts.contains(Options::SKIP_POW) {
		let hash = header.hash();
		if !target::meets_target(&hash, header.bits) {
			return Err(ErrorKind::HeaderInvalid(format!(
				"hash {} does not meet target encoded by bits {:#x}",
				hash, header.bits
			))
			.into());
		}
	}

	Ok(())
}

/// Checks `candidate_time` strictly exceeds the median of
/// `recent_timestamps` (the previous `MEDIAN_TIME_SPAN` block
/// timestamps, head included).
pub fn check_median_time_past(candidate_time: u32, recent_timestamps: &[u32]) -> Result<(), Error> {
	let median = median_time_past(recent_timestamps);
	if candidate_time <= median {
		return Err(ErrorKind::RulesViolated(format!(
			"timestamp {} does not exceed median-time-past {}",
			candidate_time, median
		))
		.into());
	}
	Ok(())
}

/// The median of up to `consensus::MEDIAN_TIME_SPAN` timestamps.
pub fn median_time_past(timestamps: &[u32]) -> u32 {
	let mut sorted = timestamps.to_vec();
	sorted.sort_unstable();
	sorted[sorted.len() / 2]
}

/// Checks `hash` at `height` against any checkpoint pinned for that
/// height. A height with no pinned checkpoint always passes.
pub fn check_checkpoint(
	height: u32,
	hash: Hash,
	checkpoints: &HashMap<u32, Hash>,
) -> Result<(), Error> {
	if let Some(expected) = checkpoints.get(&height) {
		if *expected != hash {
			return Err(ErrorKind::RulesViolated(format!(
				"block at height {} does not match checkpoint",
				height
			))
			.into());
		}
	}
	Ok(())
}

/// A rolling tally of recent block versions, used to detect when a
/// supermajority of the network has moved past a given version so
/// out-of-date blocks can start being rejected (BIP34/BIP66-style
/// soft-fork activation).
pub struct VersionTally {
	window: VecDeque<u32>,
	capacity: usize,
}

impl VersionTally {
	/// Builds an empty tally over the standard rolling window.
	pub fn new() -> VersionTally {
		VersionTally {
			window: VecDeque::with_capacity(consensus::MAJORITY_WINDOW),
			capacity: consensus::MAJORITY_WINDOW,
		}
	}

	/// Records a newly-connected block's version.
	pub fn push(&mut self, version: u32) {
		self.window.push_back(version);
		if self.window.len() > self.capacity {
			self.window.pop_front();
		}
	}

	/// Count of tallied blocks with `version` at least `min_version`.
	pub fn count_at_least(&self, min_version: u32) -> usize {
		self.window.iter().filter(|&&v| v >= min_version).count()
	}

	/// Whether the tally has filled its rolling window.
	pub fn is_full(&self) -> bool {
		self.window.len() >= self.capacity
	}
}

impl Default for VersionTally {
	fn default() -> VersionTally {
		VersionTally::new()
	}
}

/// Rejects `candidate_version` if it trails `best_version` (is
/// strictly older) while a supermajority of the rolling window has
/// already moved to `best_version` or newer.
pub fn check_supermajority(
	tally: &VersionTally,
	candidate_version: u32,
	best_version: u32,
) -> Result<(), Error> {
	if candidate_version >= best_version || !tally.is_full() {
		return Ok(());
	}
	let ahead = tally.count_at_least(best_version);
	if ahead * consensus::MAJORITY_WINDOW >= consensus::MAJORITY_REJECT_OUTDATED * tally.window.len().max(1) {
		return Err(ErrorKind::RulesViolated(format!(
			"block version {} is obsolete: {} of last {} blocks are version {} or newer",
			candidate_version,
			ahead,
			tally.window.len(),
			best_version
		))
		.into());
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn median_of_eleven_picks_middle() {
		let timestamps: Vec<u32> = (1..=11).collect();
		assert_eq!(median_time_past(&timestamps), 6);
	}

	#[test]
	fn median_is_order_independent() {
		let mut timestamps: Vec<u32> = vec![5, 1, 9, 3, 7, 2, 8, 4, 6, 11, 10];
		let a = median_time_past(&timestamps);
		timestamps.reverse();
		let b = median_time_past(&timestamps);
		assert_eq!(a, b);
	}

	#[test]
	fn checkpoint_mismatch_is_rejected() {
		let mut checkpoints = HashMap::new();
		checkpoints.insert(100, Hash::from_vec(&[1u8; 32]));
		let wrong = Hash::from_vec(&[2u8; 32]);
		assert!(check_checkpoint(100, wrong, &checkpoints).is_err());
		assert!(check_checkpoint(101, wrong, &checkpoints).is_ok());
	}

	#[test]
	fn supermajority_allows_until_window_fills() {
		let tally = VersionTally::new();
		// window isn't full yet, so an old version is still allowed.
		assert!(check_supermajority(&tally, 1, 2).is_ok());
	}

	#[test]
	fn supermajority_rejects_once_threshold_crossed() {
		let mut tally = VersionTally::new();
		tally.capacity = 10;
		for _ in 0..10 {
			tally.push(2);
		}
		assert!(check_supermajority(&tally, 1, 2).is_err());
		assert!(check_supermajority(&tally, 2, 2).is_ok());
	}
}
