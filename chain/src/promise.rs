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

//! A minimal promise/future primitive for `height_future`. Deliberately
//! not built on any platform async runtime: the engine fulfills it
//! from whichever thread's `add` call first reaches the target height,
//! and the caller blocks on `wait` (or `wait_timeout`) from whatever
//! thread it likes.

use std::sync::Arc;
use std::time::Duration;

use bsv_core::StoredBlock;
use bsv_util::{Condvar, Mutex};

struct Inner {
	value: Mutex<Option<StoredBlock>>,
	ready: Condvar,
}

/// The producer side, held by the chain engine until the target height
/// is reached.
#[derive(Clone)]
pub struct HeightPromise {
	inner: Arc<Inner>,
}

/// The consumer side, returned to callers of `height_future`.
#[derive(Clone)]
pub struct HeightFuture {
	inner: Arc<Inner>,
}

/// Builds a connected `(HeightPromise, HeightFuture)` pair.
pub fn height_promise() -> (HeightPromise, HeightFuture) {
	let inner = Arc::new(Inner {
		value: Mutex::new(None),
		ready: Condvar::new(),
	});
	(
		HeightPromise {
			inner: inner.clone(),
		},
		HeightFuture { inner },
	)
}

impl HeightPromise {
	/// Fulfills the promise. A second call is a no-op: the first block
	/// to reach the target height wins.
	pub fn fulfill(&self, block: StoredBlock) {
		let mut value = self.inner.value.lock();
		if value.is_none() {
			*value = Some(block);
			self.inner.ready.notify_all();
		}
	}
}

impl HeightFuture {
	/// Blocks the calling thread until the target height is reached.
	/// There is no cancellation or timeout here; callers that want one
	/// should use `wait_timeout`.
	pub fn wait(&self) -> StoredBlock {
		let mut value = self.inner.value.lock();
		loop {
			if let Some(block) = value.as_ref() {
				return block.clone();
			}
			self.inner.ready.wait(&mut value);
		}
	}

	/// Blocks for at most `timeout`, returning `None` if the target
	/// height was not reached in time.
	pub fn wait_timeout(&self, timeout: Duration) -> Option<StoredBlock> {
		let mut value = self.inner.value.lock();
		if let Some(block) = value.as_ref() {
			return Some(block.clone());
		}
		self.inner.ready.wait_for(&mut value, timeout);
		value.clone()
	}
}
