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

//! Error types for the chain engine.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// Error definition, wrapping an [`ErrorKind`] with a backtrace and an
/// optional cause.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// The set of ways ingesting a candidate block can fail, or the
/// non-error statuses `add` can return.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// The candidate header is malformed or its proof-of-work doesn't
	/// meet its own advertised target, or that target falls outside
	/// the network-allowed range.
	#[fail(display = "header invalid: {}", _0)]
	HeaderInvalid(String),

	/// The pluggable `RuleChecker` rejected the candidate: checkpoint
	/// mismatch, failed median-time-past check, bad version under the
	/// supermajority tally, or any network-specific context rule.
	#[fail(display = "rules violated: {}", _0)]
	RulesViolated(String),

	/// Not a hard error: the candidate's parent isn't in the store
	/// yet. Returned as a status, not propagated as a failure.
	#[fail(display = "orphan block")]
	Orphan,

	/// The block store failed to answer a query or persist a write.
	/// Fatal to the call that triggered it.
	#[fail(display = "store error: {}", _0)]
	StoreError(String),

	/// A predecessor needed to validate or connect this candidate has
	/// been pruned from the store.
	#[fail(display = "needed ancestor has been pruned")]
	Pruned,

	/// The store does not support the requested operation (e.g.
	/// `rollback` on a full, non-SPV store).
	#[fail(display = "unsupported store operation: {}", _0)]
	Unsupported(String),

	/// Two chains were asked to share ancestry (during reorg) but
	/// walking both cursors ran past the store root without meeting.
	#[fail(display = "verification error: {}", _0)]
	VerificationError(String),
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	/// The kind carried by this error.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}

	/// The underlying cause, if any.
	pub fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	/// The backtrace captured at construction, if any.
	pub fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}

	/// True for errors that indicate a bad candidate block (as opposed
	/// to an internal/store fault); useful for callers deciding whether
	/// to penalize a peer.
	pub fn is_bad_data(&self) -> bool {
		matches!(
			self.kind(),
			ErrorKind::HeaderInvalid(_) | ErrorKind::RulesViolated(_)
		)
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			inner: Context::new(kind),
		}
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}
