// Copyright 2021 Centrifuge Foundation (centrifuge.io).
//
// This file is part of the Centrifuge chain project.
// Centrifuge is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version (see http://www.gnu.org/licenses).
// Centrifuge is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

use codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};
use sp_runtime::RuntimeDebug;

use crate::{Balance, Moment};

/// Reward allocated to a single remote account.
///
/// `claimed <= total` holds for every value read from the chain, and
/// `claimed` only grows.
#[derive(
	Encode, Decode, Clone, Copy, Default, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo,
)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
pub struct RewardAllocation {
	pub total: Balance,
	pub claimed: Balance,
	pub vesting_period: Moment,
}

impl RewardAllocation {
	pub fn new(total: Balance, vesting_period: Moment) -> Self {
		Self {
			total,
			claimed: 0,
			vesting_period,
		}
	}

	/// Amount never paid out yet, whether unlocked or not.
	pub fn remaining(&self) -> Balance {
		self.total.saturating_sub(self.claimed)
	}
}

/// Global vesting parameters of the rewards pallet.
#[derive(
	Encode, Decode, Clone, Copy, Default, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo,
)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
pub struct VestingSchedule {
	/// Timestamp the vesting started at, `None` until rewards are enabled.
	pub start: Option<Moment>,
	/// Granularity of unlocks. Elapsed time is rounded down to a multiple of it.
	pub step: Moment,
}

/// What a claim session submits.
#[derive(Encode, Decode, Clone, Copy, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
pub enum ClaimMode {
	/// First claim: binds the remote account and pays the upfront share.
	Associate,
	/// Follow-up claim of whatever unlocked since the last one.
	Claim,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn remaining_never_underflows() {
		let allocation = RewardAllocation {
			total: 100,
			claimed: 120,
			vesting_period: 10,
		};

		assert_eq!(allocation.remaining(), 0);
		assert_eq!(RewardAllocation::new(100, 10).remaining(), 100);
	}
}
