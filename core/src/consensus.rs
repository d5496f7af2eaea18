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

//! Network-rule constants shared between the chain engine and whatever
//! `RuleChecker` a caller plugs in. None of these are enforced here;
//! they're just the agreed-upon numbers a real `RuleChecker` reads.

/// Target average seconds between blocks, used for `estimate_block_time`
/// extrapolation.
pub const TARGET_SPACING_SECS: u32 = 600;

/// Number of preceding block timestamps used to compute median-time-past.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Width of the rolling window over which block-version supermajority is
/// tallied for soft-fork activation checks.
pub const MAJORITY_WINDOW: usize = 1000;

/// Fraction (numerator over `MAJORITY_WINDOW`) of up-versioned blocks
/// required before a `RuleChecker` may start rejecting the old version.
pub const MAJORITY_REJECT_OUTDATED: usize = 950;

/// Fraction (numerator over `MAJORITY_WINDOW`) of up-versioned blocks
/// required before a `RuleChecker` may start enforcing the new rule.
pub const MAJORITY_ENFORCE_UPGRADE: usize = 750;
