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

//! Claimable amount computations.
//!
//! Everything here is a preview. The pallet decides what a `claim` actually
//! pays out; these values only feed the UI and the local cache.

use crowdloan_types::{Balance, Moment, RewardAllocation, VestingSchedule};
use sp_runtime::{PerThing, Perbill};

use crate::LOG_TARGET;

/// Where the contributor stands with respect to association.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssociationProgress {
	NotAssociated,
	/// Associated; `unlocked` is what the chain reports as vested so far.
	Associated { unlocked: Balance },
}

/// Amount the contributor can claim right now.
///
/// Before association this is the upfront share of the total, regardless of
/// `claimed`. Afterwards it is the chain-reported unlocked amount minus what
/// was already claimed. Never negative; an unlocked amount below `claimed`
/// is logged as a defect and yields zero.
pub fn compute_claimable(
	allocation: &RewardAllocation,
	initial_payment: Perbill,
	progress: AssociationProgress,
) -> Balance {
	match progress {
		AssociationProgress::NotAssociated => initial_payment.mul_floor(allocation.total),
		AssociationProgress::Associated { unlocked } => {
			match unlocked.checked_sub(allocation.claimed) {
				Some(claimable) => claimable,
				None => {
					log::error!(
						target: LOG_TARGET,
						"Unlocked amount {} is below claimed {}, clamping claimable to zero",
						unlocked,
						allocation.claimed,
					);
					0
				}
			}
		}
	}
}

/// What the pallet should have paid out by `now` under `schedule`.
///
/// The upfront share unlocks at the start, the rest linearly over the vesting
/// period in steps of `schedule.step`. Returns `None` while vesting has not
/// started.
pub fn unlocked_at(
	allocation: &RewardAllocation,
	initial_payment: Perbill,
	schedule: &VestingSchedule,
	now: Moment,
) -> Option<Balance> {
	let start = schedule.start?;
	let upfront = initial_payment.mul_floor(allocation.total);
	let vesting_point = now.saturating_sub(start);

	if vesting_point >= allocation.vesting_period {
		return Some(allocation.total);
	}

	let vesting_window = match vesting_point.checked_rem(schedule.step) {
		Some(rest) => vesting_point - rest,
		None => vesting_point,
	};
	let vested = allocation
		.total
		.saturating_sub(upfront)
		.saturating_mul(vesting_window.into())
		/ Balance::from(allocation.vesting_period);

	Some(upfront.saturating_add(vested))
}

/// Fold a finalized payout into an allocation.
///
/// `claimed` saturates at `total`; an overshoot means the cache drifted from
/// the chain and is logged.
pub fn fold_claimed(allocation: &RewardAllocation, delta: Balance) -> RewardAllocation {
	let remaining = allocation.remaining();

	if delta > remaining {
		log::error!(
			target: LOG_TARGET,
			"Delta {} exceeds the {} left of total {}, capping",
			delta,
			remaining,
			allocation.total,
		);
	}

	RewardAllocation {
		claimed: allocation.claimed.saturating_add(delta.min(remaining)),
		..*allocation
	}
}

#[cfg(test)]
mod tests {
	use rand::Rng;

	use super::*;

	const DAY: Moment = 24 * 60 * 60 * 1000;

	fn allocation(total: Balance, claimed: Balance) -> RewardAllocation {
		RewardAllocation {
			total,
			claimed,
			vesting_period: 48 * 7 * DAY,
		}
	}

	#[test]
	fn preview_before_association_uses_ratio() {
		let claimable = compute_claimable(
			&allocation(1000, 0),
			Perbill::from_percent(20),
			AssociationProgress::NotAssociated,
		);

		assert_eq!(claimable, 200);
	}

	#[test]
	fn preview_before_association_ignores_claimed() {
		let claimable = compute_claimable(
			&allocation(1000, 300),
			Perbill::from_percent(20),
			AssociationProgress::NotAssociated,
		);

		assert_eq!(claimable, 200);
	}

	#[test]
	fn associated_uses_chain_unlocked() {
		let claimable = compute_claimable(
			&allocation(1000, 0),
			Perbill::from_percent(20),
			AssociationProgress::Associated { unlocked: 400 },
		);

		assert_eq!(claimable, 400);

		let claimable = compute_claimable(
			&allocation(1000, 250),
			Perbill::from_percent(20),
			AssociationProgress::Associated { unlocked: 400 },
		);

		assert_eq!(claimable, 150);
	}

	#[test]
	fn unlocked_below_claimed_clamps_to_zero() {
		let claimable = compute_claimable(
			&allocation(1000, 500),
			Perbill::from_percent(20),
			AssociationProgress::Associated { unlocked: 400 },
		);

		assert_eq!(claimable, 0);
	}

	#[test]
	fn claimable_is_never_negative_nor_above_total() {
		let mut rng = rand::thread_rng();

		for _ in 0..10_000 {
			let total: Balance = rng.gen_range(0..=u64::MAX as Balance);
			let claimed = rng.gen_range(0..=total);
			let ratio = Perbill::from_parts(rng.gen_range(0..=Perbill::one().deconstruct()));
			let unlocked = rng.gen_range(0..=total);
			let alloc = allocation(total, claimed);

			let preview = compute_claimable(&alloc, ratio, AssociationProgress::NotAssociated);
			let associated =
				compute_claimable(&alloc, ratio, AssociationProgress::Associated { unlocked });

			assert!(preview <= total);
			assert!(associated <= total - claimed);
		}
	}

	mod unlocked_at {
		use super::*;

		fn schedule() -> VestingSchedule {
			VestingSchedule {
				start: Some(1_000),
				step: 7 * DAY,
			}
		}

		#[test]
		fn nothing_before_start() {
			let alloc = allocation(1000, 0);

			assert_eq!(
				unlocked_at(
					&alloc,
					Perbill::from_percent(20),
					&VestingSchedule::default(),
					DAY
				),
				None
			);
		}

		#[test]
		fn upfront_at_start_then_steps() {
			let alloc = allocation(1000, 0);
			let ratio = Perbill::from_percent(20);

			assert_eq!(unlocked_at(&alloc, ratio, &schedule(), 1_000), Some(200));
			// Inside the first step nothing more unlocks.
			assert_eq!(
				unlocked_at(&alloc, ratio, &schedule(), 1_000 + 6 * DAY),
				Some(200)
			);
			// One of 48 weekly steps: 800 / 48 more.
			assert_eq!(
				unlocked_at(&alloc, ratio, &schedule(), 1_000 + 7 * DAY),
				Some(200 + 800 / 48)
			);
			// Half way.
			assert_eq!(
				unlocked_at(&alloc, ratio, &schedule(), 1_000 + 24 * 7 * DAY),
				Some(600)
			);
		}

		#[test]
		fn everything_after_period() {
			let alloc = allocation(1000, 0);

			assert_eq!(
				unlocked_at(
					&alloc,
					Perbill::from_percent(20),
					&schedule(),
					1_000 + 48 * 7 * DAY
				),
				Some(1000)
			);
		}

		#[test]
		fn zero_step_vests_continuously() {
			let alloc = RewardAllocation {
				total: 1000,
				claimed: 0,
				vesting_period: 100,
			};
			let schedule = VestingSchedule {
				start: Some(0),
				step: 0,
			};

			assert_eq!(
				unlocked_at(&alloc, Perbill::zero(), &schedule, 25),
				Some(250)
			);
		}
	}

	#[test]
	fn fold_claimed_saturates_at_total() {
		let alloc = allocation(1000, 900);

		assert_eq!(fold_claimed(&alloc, 50).claimed, 950);
		assert_eq!(fold_claimed(&alloc, 500).claimed, 1000);
		assert_eq!(fold_claimed(&alloc, 0), alloc);
	}
}
