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

//! Merkle root construction over an ordered list of leaf hashes
//! (transaction ids), bottom-up with last-node duplication at odd
//! levels, matching the reference double-hash byte orientation.

use crate::error::{Error, ErrorKind};
use crate::hash::{double_sha256, Hash};

/// Computes the Merkle root of `leaves`.
///
/// Returns `ErrorKind::EmptyLeafList` if `leaves` is empty; an empty
/// list has no defined root. A coinbase-only block has exactly one leaf
/// and returns that leaf unchanged.
pub fn merkle_root(leaves: &[Hash]) -> Result<Hash, Error> {
	if leaves.is_empty() {
		return Err(ErrorKind::EmptyLeafList.into());
	}

	let mut level: Vec<Hash> = leaves.to_vec();
	while level.len() > 1 {
		if level.len() % 2 == 1 {
			let last = *level.last().unwrap();
			level.push(last);
		}
		level = level
			.chunks(2)
			.map(|pair| parent_hash(&pair[0], &pair[1]))
			.collect();
	}
	Ok(level[0])
}

fn parent_hash(left: &Hash, right: &Hash) -> Hash {
	let mut buf = Vec::with_capacity(64);
	buf.extend_from_slice(&reversed(left));
	buf.extend_from_slice(&reversed(right));
	let digest = double_sha256(&buf);
	Hash(reversed(&Hash(digest)))
}

fn reversed(h: &Hash) -> [u8; 32] {
	let mut arr = [0u8; 32];
	arr.copy_from_slice(h.as_bytes());
	arr.reverse();
	arr
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn single_leaf_is_its_own_root() {
		let leaf = Hash::from_vec(&[5u8; 32]);
		assert_eq!(merkle_root(&[leaf]).unwrap(), leaf);
	}

	#[test]
	fn odd_level_duplicates_last_node() {
		let a = Hash::from_vec(&[1u8; 32]);
		let b = Hash::from_vec(&[2u8; 32]);
		let c = Hash::from_vec(&[3u8; 32]);
		let with_three = merkle_root(&[a, b, c]).unwrap();
		let with_dup = merkle_root(&[a, b, c, c]).unwrap();
		assert_eq!(with_three, with_dup);
	}

	#[test]
	fn deterministic_for_same_input() {
		let a = Hash::from_vec(&[1u8; 32]);
		let b = Hash::from_vec(&[2u8; 32]);
		assert_eq!(merkle_root(&[a, b]).unwrap(), merkle_root(&[a, b]).unwrap());
	}

	#[test]
	fn empty_leaves_is_an_error() {
		let empty: Vec<Hash> = Vec::new();
		assert_eq!(merkle_root(&empty).unwrap_err().kind(), ErrorKind::EmptyLeafList);
	}
}
