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

//! Error types for the script interpreter. A script either verifies or
//! it doesn't: every failure mode collapses to a single `Error`, never
//! a partial success.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// Error definition, wrapping an [`ErrorKind`] with a backtrace and an
/// optional cause, following the same shape used throughout the
/// workspace.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// The set of ways script evaluation can fail.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// A program (scriptSig or scriptPubKey) exceeds the 10 000-byte
	/// program size limit.
	#[fail(display = "script exceeds maximum program size")]
	ScriptTooLarge,

	/// A push chunk exceeds `MAX_SCRIPT_ELEMENT_SIZE` (520 bytes).
	#[fail(display = "push exceeds maximum element size")]
	PushTooLarge,

	/// The opcode count (excluding direct pushes and `OP_1..OP_16`)
	/// exceeded 201.
	#[fail(display = "exceeded maximum opcode count")]
	TooManyOpcodes,

	/// Combined main+alt stack depth exceeded 1000 elements.
	#[fail(display = "exceeded maximum stack size")]
	StackSizeExceeded,

	/// A chunk's length prefix runs past the end of the program.
	#[fail(display = "malformed push: {}", _0)]
	MalformedPush(String),

	/// An operation needed more stack elements than were present.
	#[fail(display = "stack underflow")]
	StackUnderflow,

	/// `OP_RETURN`, or a top-of-stack final value that casts to false.
	#[fail(display = "script evaluated to false")]
	EvalFalse,

	/// A `*VERIFY` opcode's condition was false.
	#[fail(display = "verify failed: {}", _0)]
	VerifyFailed(&'static str),

	/// A disabled opcode was reached, executed or not.
	#[fail(display = "disabled opcode: {}", _0)]
	DisabledOpcode(&'static str),

	/// `OP_VERIF`/`OP_VERNOTIF`, or any other opcode that always fails
	/// regardless of conditional suppression.
	#[fail(display = "invalid opcode: {}", _0)]
	InvalidOpcode(&'static str),

	/// An `if_stack` was unbalanced at the end of the program (an
	/// `OP_IF`/`OP_NOTIF` with no matching `OP_ENDIF`).
	#[fail(display = "unbalanced conditional")]
	UnbalancedConditional,

	/// A number decoded from the stack used more than 4 bytes.
	#[fail(display = "number overflows 4-byte MPI encoding")]
	NumberOverflow,

	/// `OP_CHECKMULTISIG(VERIFY)` pubkey or sig count outside `0..=20`
	/// or `0..=pubkey_count` respectively.
	#[fail(display = "invalid multisig count: {}", _0)]
	InvalidMultisigCount(&'static str),

	/// The P2SH scriptSig contained a non-push opcode.
	#[fail(display = "scriptSig for P2SH must contain only pushes")]
	SigPushOnly,
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
