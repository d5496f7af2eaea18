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

//! The stack machine itself: chunk-at-a-time evaluation of a parsed
//! script against a shared main/alt stack, and `correctly_spends`, the
//! entry point that runs a scriptSig/scriptPubKey pair (with optional
//! P2SH redemption) to decide whether an input is authorized to spend.

use bsv_core::hash::double_sha256;
use enum_primitive::FromPrimitive;
use ripemd160::{Digest as RipemdDigest, Ripemd160};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};
use sha1::{Digest as Sha1Digest, Sha1};
use sha2::{Digest as Sha256Digest, Sha256};

use crate::chunk::ScriptChunk;
use crate::error::{Error, ErrorKind};
use crate::flags::VerifyFlags;
use crate::num::{cast_to_bool, decode_num, encode_num};
use crate::opcode::Opcode;
use crate::parser;
use crate::sighash::SighashProvider;

const MAX_SCRIPT_SIZE: usize = 10_000;
const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
const MAX_OPS_PER_SCRIPT: usize = 201;
const MAX_STACK_SIZE: usize = 1000;
const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// The shared main/alt stack a scriptSig and its scriptPubKey (and, for
/// P2SH, the redeem script) execute against in sequence.
struct Stacks {
	main: Vec<Vec<u8>>,
	alt: Vec<Vec<u8>>,
}

impl Stacks {
	fn new() -> Stacks {
		Stacks { main: Vec::new(), alt: Vec::new() }
	}

	fn check_size(&self) -> Result<(), Error> {
		if self.main.len() + self.alt.len() > MAX_STACK_SIZE {
			return Err(ErrorKind::StackSizeExceeded.into());
		}
		Ok(())
	}

	fn push(&mut self, item: Vec<u8>) -> Result<(), Error> {
		self.main.push(item);
		self.check_size()
	}

	fn pop(&mut self) -> Result<Vec<u8>, Error> {
		self.main.pop().ok_or_else(|| ErrorKind::StackUnderflow.into())
	}

	fn top(&self, back: usize) -> Result<&Vec<u8>, Error> {
		let len = self.main.len();
		if back >= len {
			return Err(ErrorKind::StackUnderflow.into());
		}
		Ok(&self.main[len - 1 - back])
	}

	fn pop_bool(&mut self) -> Result<bool, Error> {
		Ok(cast_to_bool(&self.pop()?))
	}

	fn pop_num(&mut self) -> Result<i64, Error> {
		decode_num(&self.pop()?)
	}

	fn push_num(&mut self, n: i64) -> Result<(), Error> {
		self.push(encode_num(n))
	}

	fn push_bool(&mut self, b: bool) -> Result<(), Error> {
		self.push(if b { vec![1] } else { Vec::new() })
	}
}

/// Per-call context an executing script needs beyond its own bytes: who
/// to ask for a sighash, and under what verification policy.
pub struct ExecContext<'a> {
	/// The input being verified, passed through to `hash_for_signature`.
	pub input_index: usize,
	/// Computes the digest `OP_CHECKSIG`/`OP_CHECKMULTISIG` verify
	/// against.
	pub sighash: &'a dyn SighashProvider,
	/// Verification policy flags.
	pub flags: VerifyFlags,
}

/// Runs `program` against `stacks`, left to right. Pushes mutate
/// `stacks.main`/`stacks.alt` in place; the caller inspects the stack
/// after return to decide success.
fn execute(program: &[u8], stacks: &mut Stacks, ctx: &ExecContext) -> Result<(), Error> {
	if program.len() > MAX_SCRIPT_SIZE {
		return Err(ErrorKind::ScriptTooLarge.into());
	}

	let chunks = parser::parse(program)?;
	let mut if_stack: Vec<bool> = Vec::new();
	let mut op_count = 0usize;
	let mut last_sep = 0usize;

	for (idx, chunk) in chunks.iter().enumerate() {
		let should_execute = if_stack.iter().all(|&b| b);

		match chunk {
			ScriptChunk::Push { data, .. } => {
				if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
					return Err(ErrorKind::PushTooLarge.into());
				}
				if should_execute {
					stacks.push(data.clone())?;
				}
			}
			ScriptChunk::Op { code, start } => {
				let code = *code;

				if code as u32 > Opcode::OP_16.as_u8() as u32 {
					op_count += 1;
					if op_count > MAX_OPS_PER_SCRIPT {
						return Err(ErrorKind::TooManyOpcodes.into());
					}
				}

				let opcode = Opcode::from_u8(code);

				if let Some(op) = opcode {
					if op.is_disabled() {
						return Err(ErrorKind::DisabledOpcode(op.name()).into());
					}
					if matches!(op, Opcode::OP_VERIF | Opcode::OP_VERNOTIF) {
						return Err(ErrorKind::InvalidOpcode(op.name()).into());
					}
				}

				let is_conditional = matches!(
					opcode,
					Some(Opcode::OP_IF) | Some(Opcode::OP_NOTIF) | Some(Opcode::OP_ELSE) | Some(Opcode::OP_ENDIF)
				);

				if !should_execute && !is_conditional {
					continue;
				}

				match opcode {
					Some(Opcode::OP_IF) | Some(Opcode::OP_NOTIF) => {
						let branch_taken = if should_execute {
							let want_true = matches!(opcode, Some(Opcode::OP_IF));
							let top = stacks.pop_bool()?;
							top == want_true
						} else {
							false
						};
						if_stack.push(branch_taken);
					}
					Some(Opcode::OP_ELSE) => {
						let last = if_stack.last_mut().ok_or(ErrorKind::UnbalancedConditional)?;
						*last = !*last;
					}
					Some(Opcode::OP_ENDIF) => {
						if_stack.pop().ok_or(ErrorKind::UnbalancedConditional)?;
					}
					Some(Opcode::OP_NOP) => {}
					Some(Opcode::OP_VERIFY) => {
						if !stacks.pop_bool()? {
							return Err(ErrorKind::VerifyFailed("OP_VERIFY").into());
						}
					}
					Some(Opcode::OP_RETURN) => {
						return Err(ErrorKind::EvalFalse.into());
					}
					Some(Opcode::OP_1NEGATE) => stacks.push_num(-1)?,
					Some(Opcode::OP_0) => stacks.push(Vec::new())?,
					Some(op) if is_small_int(op) => {
						stacks.push_num(small_int_value(op))?;
					}

					// -- stack manipulation --
					Some(Opcode::OP_TOALTSTACK) => {
						let v = stacks.pop()?;
						stacks.alt.push(v);
						stacks.check_size()?;
					}
					Some(Opcode::OP_FROMALTSTACK) => {
						let v = stacks.alt.pop().ok_or(ErrorKind::StackUnderflow)?;
						stacks.push(v)?;
					}
					Some(Opcode::OP_2DROP) => {
						stacks.pop()?;
						stacks.pop()?;
					}
					Some(Opcode::OP_2DUP) => {
						let b = stacks.top(0)?.clone();
						let a = stacks.top(1)?.clone();
						stacks.push(a)?;
						stacks.push(b)?;
					}
					Some(Opcode::OP_3DUP) => {
						let c = stacks.top(0)?.clone();
						let b = stacks.top(1)?.clone();
						let a = stacks.top(2)?.clone();
						stacks.push(a)?;
						stacks.push(b)?;
						stacks.push(c)?;
					}
					Some(Opcode::OP_2OVER) => {
						let b = stacks.top(2)?.clone();
						let a = stacks.top(3)?.clone();
						stacks.push(a)?;
						stacks.push(b)?;
					}
					Some(Opcode::OP_2ROT) => {
						let len = stacks.main.len();
						if len < 6 {
							return Err(ErrorKind::StackUnderflow.into());
						}
						let drained: Vec<Vec<u8>> = stacks.main.drain(len - 6..).collect();
						stacks.main.extend_from_slice(&drained[2..]);
						stacks.main.extend_from_slice(&drained[..2]);
					}
					Some(Opcode::OP_2SWAP) => {
						let len = stacks.main.len();
						if len < 4 {
							return Err(ErrorKind::StackUnderflow.into());
						}
						stacks.main.swap(len - 4, len - 2);
						stacks.main.swap(len - 3, len - 1);
					}
					Some(Opcode::OP_IFDUP) => {
						let top = stacks.top(0)?.clone();
						if cast_to_bool(&top) {
							stacks.push(top)?;
						}
					}
					Some(Opcode::OP_DEPTH) => {
						let depth = stacks.main.len() as i64;
						stacks.push_num(depth)?;
					}
					Some(Opcode::OP_DROP) => {
						stacks.pop()?;
					}
					Some(Opcode::OP_DUP) => {
						let top = stacks.top(0)?.clone();
						stacks.push(top)?;
					}
					Some(Opcode::OP_NIP) => {
						let v = stacks.pop()?;
						stacks.pop()?;
						stacks.push(v)?;
					}
					Some(Opcode::OP_OVER) => {
						let v = stacks.top(1)?.clone();
						stacks.push(v)?;
					}
					Some(Opcode::OP_PICK) | Some(Opcode::OP_ROLL) => {
						let n = stacks.pop_num()?;
						if n < 0 {
							return Err(ErrorKind::StackUnderflow.into());
						}
						let n = n as usize;
						let len = stacks.main.len();
						if n >= len {
							return Err(ErrorKind::StackUnderflow.into());
						}
						let idx = len - 1 - n;
						let v = if opcode == Some(Opcode::OP_ROLL) {
							stacks.main.remove(idx)
						} else {
							stacks.main[idx].clone()
						};
						stacks.push(v)?;
					}
					Some(Opcode::OP_ROT) => {
						let len = stacks.main.len();
						if len < 3 {
							return Err(ErrorKind::StackUnderflow.into());
						}
						stacks.main.swap(len - 3, len - 2);
						stacks.main.swap(len - 2, len - 1);
					}
					Some(Opcode::OP_SWAP) => {
						let len = stacks.main.len();
						if len < 2 {
							return Err(ErrorKind::StackUnderflow.into());
						}
						stacks.main.swap(len - 2, len - 1);
					}
					Some(Opcode::OP_TUCK) => {
						let len = stacks.main.len();
						if len < 2 {
							return Err(ErrorKind::StackUnderflow.into());
						}
						let top = stacks.main[len - 1].clone();
						stacks.main.insert(len - 2, top);
						stacks.check_size()?;
					}

					// -- splice (only OP_SIZE is enabled) --
					Some(Opcode::OP_SIZE) => {
						let len = stacks.top(0)?.len() as i64;
						stacks.push_num(len)?;
					}

					// -- bitwise / equality --
					Some(Opcode::OP_EQUAL) | Some(Opcode::OP_EQUALVERIFY) => {
						let b = stacks.pop()?;
						let a = stacks.pop()?;
						let equal = a == b;
						if opcode == Some(Opcode::OP_EQUALVERIFY) {
							if !equal {
								return Err(ErrorKind::VerifyFailed("OP_EQUALVERIFY").into());
							}
						} else {
							stacks.push_bool(equal)?;
						}
					}

					// -- arithmetic --
					Some(Opcode::OP_1ADD) => {
						let n = stacks.pop_num()?;
						stacks.push_num(n + 1)?;
					}
					Some(Opcode::OP_1SUB) => {
						let n = stacks.pop_num()?;
						stacks.push_num(n - 1)?;
					}
					Some(Opcode::OP_NEGATE) => {
						let n = stacks.pop_num()?;
						stacks.push_num(-n)?;
					}
					Some(Opcode::OP_ABS) => {
						let n = stacks.pop_num()?;
						stacks.push_num(n.abs())?;
					}
					Some(Opcode::OP_NOT) => {
						let n = stacks.pop_num()?;
						stacks.push_bool(n == 0)?;
					}
					Some(Opcode::OP_0NOTEQUAL) => {
						let n = stacks.pop_num()?;
						stacks.push_bool(n != 0)?;
					}
					Some(Opcode::OP_ADD) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_num(a + b)?;
					}
					Some(Opcode::OP_SUB) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_num(a - b)?;
					}
					Some(Opcode::OP_BOOLAND) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_bool(a != 0 && b != 0)?;
					}
					Some(Opcode::OP_BOOLOR) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_bool(a != 0 || b != 0)?;
					}
					Some(Opcode::OP_NUMEQUAL) | Some(Opcode::OP_NUMEQUALVERIFY) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						let equal = a == b;
						if opcode == Some(Opcode::OP_NUMEQUALVERIFY) {
							if !equal {
								return Err(ErrorKind::VerifyFailed("OP_NUMEQUALVERIFY").into());
							}
						} else {
							stacks.push_bool(equal)?;
						}
					}
					Some(Opcode::OP_NUMNOTEQUAL) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_bool(a != b)?;
					}
					Some(Opcode::OP_LESSTHAN) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_bool(a < b)?;
					}
					Some(Opcode::OP_GREATERTHAN) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_bool(a > b)?;
					}
					Some(Opcode::OP_LESSTHANOREQUAL) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_bool(a <= b)?;
					}
					Some(Opcode::OP_GREATERTHANOREQUAL) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_bool(a >= b)?;
					}
					Some(Opcode::OP_MIN) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_num(a.min(b))?;
					}
					Some(Opcode::OP_MAX) => {
						let b = stacks.pop_num()?;
						let a = stacks.pop_num()?;
						stacks.push_num(a.max(b))?;
					}
					Some(Opcode::OP_WITHIN) => {
						let max = stacks.pop_num()?;
						let min = stacks.pop_num()?;
						let x = stacks.pop_num()?;
						stacks.push_bool(x >= min && x < max)?;
					}

					// -- crypto --
					Some(Opcode::OP_RIPEMD160) => {
						let v = stacks.pop()?;
						stacks.push(Ripemd160::digest(&v).to_vec())?;
					}
					Some(Opcode::OP_SHA1) => {
						let v = stacks.pop()?;
						stacks.push(Sha1::digest(&v).to_vec())?;
					}
					Some(Opcode::OP_SHA256) => {
						let v = stacks.pop()?;
						stacks.push(Sha256::digest(&v).to_vec())?;
					}
					Some(Opcode::OP_HASH160) => {
						let v = stacks.pop()?;
						let sha = Sha256::digest(&v);
						stacks.push(Ripemd160::digest(&sha).to_vec())?;
					}
					Some(Opcode::OP_HASH256) => {
						let v = stacks.pop()?;
						stacks.push(double_sha256(&v).to_vec())?;
					}
					Some(Opcode::OP_CODESEPARATOR) => {
						last_sep = start + 1;
					}
					Some(Opcode::OP_CHECKSIG) | Some(Opcode::OP_CHECKSIGVERIFY) => {
						let pubkey = stacks.pop()?;
						let sig = stacks.pop()?;
						let sub_script = find_and_delete(&program[last_sep..], &serialize_push(&sig));
						let ok = check_signature(&sig, &pubkey, &sub_script, ctx);
						if opcode == Some(Opcode::OP_CHECKSIGVERIFY) {
							if !ok {
								return Err(ErrorKind::VerifyFailed("OP_CHECKSIGVERIFY").into());
							}
						} else {
							stacks.push_bool(ok)?;
						}
					}
					Some(Opcode::OP_CHECKMULTISIG) | Some(Opcode::OP_CHECKMULTISIGVERIFY) => {
						let ok = check_multisig(stacks, &program[last_sep..], ctx, &mut op_count)?;
						if op_count > MAX_OPS_PER_SCRIPT {
							return Err(ErrorKind::TooManyOpcodes.into());
						}
						if opcode == Some(Opcode::OP_CHECKMULTISIGVERIFY) {
							if !ok {
								return Err(ErrorKind::VerifyFailed("OP_CHECKMULTISIGVERIFY").into());
							}
						} else {
							stacks.push_bool(ok)?;
						}
					}
					Some(op) if is_nop(op) => {}
					Some(Opcode::OP_RESERVED) | Some(Opcode::OP_RESERVED1) | Some(Opcode::OP_RESERVED2)
					| Some(Opcode::OP_VER) => {
						return Err(ErrorKind::InvalidOpcode("OP_RESERVED").into());
					}
					_ => {
						return Err(ErrorKind::InvalidOpcode("unknown opcode").into());
					}
				}
			}
		}

		let _ = idx;
	}

	if !if_stack.is_empty() {
		return Err(ErrorKind::UnbalancedConditional.into());
	}

	Ok(())
}

fn is_small_int(op: Opcode) -> bool {
	(Opcode::OP_1.as_u8()..=Opcode::OP_16.as_u8()).contains(&op.as_u8())
}

/// True for `OP_NOP` and the reserved-for-upgrade `OP_NOP1..OP_NOP10`
/// range, all of which are plain no-ops unless a verify flag upgrades
/// one of them (see `VerifyFlags`'s reserved CLTV/CSV bits).
fn is_nop(op: Opcode) -> bool {
	op == Opcode::OP_NOP || (Opcode::OP_NOP1.as_u8()..=Opcode::OP_NOP10.as_u8()).contains(&op.as_u8())
}

fn small_int_value(op: Opcode) -> i64 {
	(op.as_u8() - Opcode::OP_1.as_u8() + 1) as i64
}

/// Verifies `correctly_spends`'s precondition that `script_sig`
/// contains only data pushes (opcode value `<= OP_16`), the ordering
/// check BIP16 performs before looking at the P2SH redeem stack.
fn is_push_only(program: &[u8]) -> Result<bool, Error> {
	for chunk in parser::parse(program)? {
		if let ScriptChunk::Op { code, .. } = chunk {
			if code > Opcode::OP_16.as_u8() {
				return Ok(false);
			}
		}
	}
	Ok(true)
}

/// Whether `script_pubkey` is exactly the P2SH template:
/// `OP_HASH160 <20 bytes> OP_EQUAL`.
fn is_p2sh_template(script_pubkey: &[u8]) -> bool {
	script_pubkey.len() == 23
		&& script_pubkey[0] == Opcode::OP_HASH160.as_u8()
		&& script_pubkey[1] == 0x14
		&& script_pubkey[22] == Opcode::OP_EQUAL.as_u8()
}

/// The minimal push encoding `data` would use if it appeared literally
/// in a script, used to strip a signature's own encoding out of the
/// sub-script it's checked against.
fn serialize_push(data: &[u8]) -> Vec<u8> {
	use byteorder::{ByteOrder, LittleEndian};
	let mut out = Vec::with_capacity(data.len() + 5);
	let len = data.len();
	if len == 0 {
		out.push(0x00);
	} else if len <= 0x4b {
		out.push(len as u8);
	} else if len <= 0xff {
		out.push(Opcode::OP_PUSHDATA1.as_u8());
		out.push(len as u8);
	} else if len <= 0xffff {
		out.push(Opcode::OP_PUSHDATA2.as_u8());
		let mut buf = [0u8; 2];
		LittleEndian::write_u16(&mut buf, len as u16);
		out.extend_from_slice(&buf);
	} else {
		out.push(Opcode::OP_PUSHDATA4.as_u8());
		let mut buf = [0u8; 4];
		LittleEndian::write_u32(&mut buf, len as u32);
		out.extend_from_slice(&buf);
	}
	out.extend_from_slice(data);
	out
}

/// Removes every non-overlapping occurrence of `pattern` from `data`,
/// matching the reference client's `FindAndDelete`.
fn find_and_delete(data: &[u8], pattern: &[u8]) -> Vec<u8> {
	if pattern.is_empty() || pattern.len() > data.len() {
		return data.to_vec();
	}
	let mut out = Vec::with_capacity(data.len());
	let mut i = 0;
	while i < data.len() {
		if data[i..].starts_with(pattern) {
			i += pattern.len();
		} else {
			out.push(data[i]);
			i += 1;
		}
	}
	out
}

fn check_signature(sig: &[u8], pubkey: &[u8], sub_script: &[u8], ctx: &ExecContext) -> bool {
	if sig.is_empty() {
		return false;
	}
	let sighash_type = sig[sig.len() - 1];
	let der_sig = &sig[..sig.len() - 1];

	let secp = Secp256k1::verification_only();
	let parsed_sig = match Signature::from_der(der_sig) {
		Ok(s) => s,
		Err(_) => return false,
	};
	let parsed_pubkey = match PublicKey::from_slice(pubkey) {
		Ok(p) => p,
		Err(_) => return false,
	};
	let digest = ctx.sighash.hash_for_signature(ctx.input_index, sub_script, sighash_type);
	let message = match Message::from_slice(digest.as_bytes()) {
		Ok(m) => m,
		Err(_) => return false,
	};
	secp.verify_ecdsa(&message, &parsed_sig, &parsed_pubkey).is_ok()
}

/// `OP_CHECKMULTISIG`/`VERIFY`: pops pubkey count, that many pubkeys,
/// sig count, that many sigs, then one extra dummy item — the
/// reference client's off-by-one, preserved deliberately.
fn check_multisig(stacks: &mut Stacks, program_tail: &[u8], ctx: &ExecContext, op_count: &mut usize) -> Result<bool, Error> {
	let pubkey_count = stacks.pop_num()?;
	if !(0..=MAX_PUBKEYS_PER_MULTISIG as i64).contains(&pubkey_count) {
		return Err(ErrorKind::InvalidMultisigCount("pubkey count out of range").into());
	}
	*op_count += pubkey_count as usize;

	let mut pubkeys = Vec::with_capacity(pubkey_count as usize);
	for _ in 0..pubkey_count {
		pubkeys.push(stacks.pop()?);
	}

	let sig_count = stacks.pop_num()?;
	if !(0..=pubkey_count).contains(&sig_count) {
		return Err(ErrorKind::InvalidMultisigCount("sig count out of range").into());
	}

	let mut sigs = Vec::with_capacity(sig_count as usize);
	for _ in 0..sig_count {
		sigs.push(stacks.pop()?);
	}

	// the reference client's off-by-one: one extra item is always
	// popped and discarded, unused by the check itself.
	stacks.pop()?;

	let mut sub_script = program_tail.to_vec();
	for sig in &sigs {
		sub_script = find_and_delete(&sub_script, &serialize_push(sig));
	}

	let mut sig_idx = 0;
	let mut key_idx = 0;
	while sig_idx < sigs.len() && key_idx < pubkeys.len() {
		if check_signature(&sigs[sig_idx], &pubkeys[key_idx], &sub_script, ctx) {
			sig_idx += 1;
		}
		key_idx += 1;
	}

	Ok(sig_idx == sigs.len())
}

/// Runs `script_sig` against `script_pubkey` for input `input_index`,
/// following the seven-step contract: reject oversized programs,
/// execute scriptSig, snapshot the stack for a possible P2SH
/// redemption, execute scriptPubKey, require a truthy result, and — if
/// P2SH is enabled and the scriptPubKey is exactly the P2SH template —
/// verify scriptSig was push-only *before* evaluating the redeem
/// script against the snapshotted stack.
pub fn correctly_spends(
	input_index: usize,
	script_sig: &[u8],
	script_pubkey: &[u8],
	sighash: &dyn SighashProvider,
	flags: VerifyFlags,
) -> Result<(), Error> {
	if script_sig.len() > MAX_SCRIPT_SIZE || script_pubkey.len() > MAX_SCRIPT_SIZE {
		return Err(ErrorKind::ScriptTooLarge.into());
	}

	let ctx = ExecContext { input_index, sighash, flags };
	let mut stacks = Stacks::new();

	execute(script_sig, &mut stacks, &ctx)?;

	let p2sh_stack = stacks.main.clone();

	execute(script_pubkey, &mut stacks, &ctx)?;

	if !stacks.pop_bool()? {
		return Err(ErrorKind::EvalFalse.into());
	}

	if flags.contains(VerifyFlags::P2SH) && is_p2sh_template(script_pubkey) {
		if !is_push_only(script_sig)? {
			return Err(ErrorKind::SigPushOnly.into());
		}

		let mut redeem_stacks = Stacks { main: p2sh_stack, alt: Vec::new() };
		let redeem_script = redeem_stacks.pop()?;

		execute(&redeem_script, &mut redeem_stacks, &ctx)?;

		if !redeem_stacks.pop_bool()? {
			return Err(ErrorKind::EvalFalse.into());
		}
	}

	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use bsv_core::Hash;

	struct FixedSighash(Hash);

	impl SighashProvider for FixedSighash {
		fn hash_for_signature(&self, _input_index: usize, _sub_script: &[u8], _sighash_type: u8) -> Hash {
			self.0
		}
	}

	fn no_sig_checks() -> FixedSighash {
		FixedSighash(Hash::from_vec(&[0u8; 32]))
	}

	#[test]
	fn trivial_push_only_script_accepts() {
		// scriptSig: push 1 (truthy); scriptPubKey: OP_NOP OP_1
		let script_sig = vec![0x51]; // OP_1
		let script_pubkey = vec![Opcode::OP_NOP.as_u8(), Opcode::OP_1.as_u8()];
		let checker = no_sig_checks();
		assert!(correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::NONE).is_ok());
	}

	#[test]
	fn disabled_opcode_fails_even_in_dead_branch() {
		// OP_0 OP_IF OP_CAT OP_ENDIF OP_1
		let script_sig: Vec<u8> = vec![];
		let script_pubkey = vec![
			Opcode::OP_0.as_u8(),
			Opcode::OP_IF.as_u8(),
			Opcode::OP_CAT.as_u8(),
			Opcode::OP_ENDIF.as_u8(),
			Opcode::OP_1.as_u8(),
		];
		let checker = no_sig_checks();
		let err = correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::NONE).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::DisabledOpcode("OP_CAT"));
	}

	#[test]
	fn equal_verify_passes_identical_pushes() {
		let script_sig: Vec<u8> = vec![];
		let script_pubkey = vec![
			0x01, 0xab, // push [0xab]
			0x01, 0xab, // push [0xab]
			Opcode::OP_EQUAL.as_u8(),
		];
		let checker = no_sig_checks();
		assert!(correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::NONE).is_ok());
	}

	#[test]
	fn arithmetic_add_produces_expected_sum() {
		// push 2, push 3, OP_ADD, OP_5 OP_NUMEQUAL
		let script_sig: Vec<u8> = vec![];
		let script_pubkey = vec![
			Opcode::OP_2.as_u8(),
			Opcode::OP_3.as_u8(),
			Opcode::OP_ADD.as_u8(),
			Opcode::OP_5.as_u8(),
			Opcode::OP_NUMEQUAL.as_u8(),
		];
		let checker = no_sig_checks();
		assert!(correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::NONE).is_ok());
	}

	#[test]
	fn reserved_nop_range_is_a_no_op() {
		// every OP_NOP1..OP_NOP10 must execute as a plain no-op
		let script_sig: Vec<u8> = vec![];
		let checker = no_sig_checks();
		for op in Opcode::OP_NOP1.as_u8()..=Opcode::OP_NOP10.as_u8() {
			let script_pubkey = vec![op, Opcode::OP_1.as_u8()];
			assert!(
				correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::NONE).is_ok(),
				"opcode {:#x} should be a no-op",
				op
			);
		}
	}

	#[test]
	fn false_result_is_rejected() {
		let script_sig: Vec<u8> = vec![];
		let script_pubkey = vec![Opcode::OP_0.as_u8()];
		let checker = no_sig_checks();
		assert!(correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::NONE).is_err());
	}

	fn secret_key(byte: u8) -> secp256k1::SecretKey {
		secp256k1::SecretKey::from_slice(&[byte; 32]).unwrap()
	}

	fn sign(secp: &Secp256k1<secp256k1::SignOnly>, sk: &secp256k1::SecretKey, digest: &Hash, sighash_type: u8) -> Vec<u8> {
		let message = Message::from_slice(digest.as_bytes()).unwrap();
		let sig = secp.sign_ecdsa(&message, sk);
		let mut out = sig.serialize_der().to_vec();
		out.push(sighash_type);
		out
	}

	fn push_data(data: &[u8]) -> Vec<u8> {
		serialize_push(data)
	}

	#[test]
	fn p2pkh_scenario_accepts_a_matching_signature() {
		// scriptPubKey: OP_DUP OP_HASH160 <hash160(pk)> OP_EQUALVERIFY OP_CHECKSIG
		// scriptSig: <sig> <pk>
		let secp = Secp256k1::signing_only();
		let sk = secret_key(1);
		let pk = PublicKey::from_secret_key(&secp, &sk);
		let pk_bytes = pk.serialize().to_vec();
		let pk_hash = Ripemd160::digest(&Sha256::digest(&pk_bytes)).to_vec();

		let checker = FixedSighash(Hash::from_vec(&[7u8; 32]));
		let sig = sign(&secp, &sk, &checker.0, 0x01);

		let mut script_sig = Vec::new();
		script_sig.extend(push_data(&sig));
		script_sig.extend(push_data(&pk_bytes));

		let mut script_pubkey = Vec::new();
		script_pubkey.push(Opcode::OP_DUP.as_u8());
		script_pubkey.push(Opcode::OP_HASH160.as_u8());
		script_pubkey.extend(push_data(&pk_hash));
		script_pubkey.push(Opcode::OP_EQUALVERIFY.as_u8());
		script_pubkey.push(Opcode::OP_CHECKSIG.as_u8());

		assert!(correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::NONE).is_ok());
	}

	#[test]
	fn p2sh_multisig_scenario_accepts_two_of_three_and_rejects_a_flipped_signature() {
		// redeem script: OP_2 <pk1> <pk2> <pk3> OP_3 OP_CHECKMULTISIG
		let secp = Secp256k1::signing_only();
		let sks: Vec<_> = (1u8..=3u8).map(secret_key).collect();
		let pubkeys: Vec<Vec<u8>> =
			sks.iter().map(|sk| PublicKey::from_secret_key(&secp, sk).serialize().to_vec()).collect();

		let mut redeem = Vec::new();
		redeem.push(Opcode::OP_2.as_u8());
		for pk in &pubkeys {
			redeem.extend(push_data(pk));
		}
		redeem.push(Opcode::OP_3.as_u8());
		redeem.push(Opcode::OP_CHECKMULTISIG.as_u8());

		let redeem_hash = Ripemd160::digest(&Sha256::digest(&redeem)).to_vec();
		let mut script_pubkey = Vec::new();
		script_pubkey.push(Opcode::OP_HASH160.as_u8());
		script_pubkey.extend(push_data(&redeem_hash));
		script_pubkey.push(Opcode::OP_EQUAL.as_u8());

		let checker = FixedSighash(Hash::from_vec(&[9u8; 32]));
		let sig1 = sign(&secp, &sks[0], &checker.0, 0x01);
		let sig2 = sign(&secp, &sks[1], &checker.0, 0x01);

		let mut script_sig = Vec::new();
		script_sig.push(Opcode::OP_0.as_u8()); // the off-by-one dummy element
		script_sig.extend(push_data(&sig1));
		script_sig.extend(push_data(&sig2));
		script_sig.extend(push_data(&redeem));

		assert!(correctly_spends(0, &script_sig, &script_pubkey, &checker, VerifyFlags::P2SH).is_ok());

		let mut flipped_sig2 = sig2.clone();
		let last = flipped_sig2.len() - 2;
		flipped_sig2[last] ^= 0x01;

		let mut bad_script_sig = Vec::new();
		bad_script_sig.push(Opcode::OP_0.as_u8());
		bad_script_sig.extend(push_data(&sig1));
		bad_script_sig.extend(push_data(&flipped_sig2));
		bad_script_sig.extend(push_data(&redeem));

		assert!(correctly_spends(0, &bad_script_sig, &script_pubkey, &checker, VerifyFlags::P2SH).is_err());
	}
}
