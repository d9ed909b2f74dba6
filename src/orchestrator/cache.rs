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

use std::collections::BTreeMap;

use crowdloan_types::{Association, Balance, RemoteAccount, RewardAccount, RewardAllocation};

use crate::vesting::fold_claimed;

/// Last known chain figures, advisory only.
///
/// Refreshed from the chain on every session start and otherwise only
/// touched when a submission is finalized.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AllocationCache {
	allocations: BTreeMap<RemoteAccount, RewardAllocation>,
	claimable: BTreeMap<RemoteAccount, Balance>,
	associations: BTreeMap<RewardAccount, Association>,
	eligibility_stale: bool,
}

impl AllocationCache {
	pub fn allocation(&self, remote: &RemoteAccount) -> Option<&RewardAllocation> {
		self.allocations.get(remote)
	}

	pub fn claimable(&self, remote: &RemoteAccount) -> Balance {
		self.claimable.get(remote).copied().unwrap_or_default()
	}

	pub fn association(&self, reward_account: &RewardAccount) -> Option<&Association> {
		self.associations.get(reward_account)
	}

	/// Whether a finalized association changed eligibility since the last
	/// call, clearing the flag.
	pub fn take_eligibility_stale(&mut self) -> bool {
		std::mem::take(&mut self.eligibility_stale)
	}

	pub(crate) fn refresh(
		&mut self,
		remote: RemoteAccount,
		allocation: RewardAllocation,
		claimable: Balance,
	) {
		self.allocations.insert(remote.clone(), allocation);
		self.claimable.insert(remote, claimable);
	}

	pub(crate) fn refresh_association(&mut self, association: Association) {
		self.associations
			.insert(association.reward_account.clone(), association);
	}

	/// Fold a finalized payout: `claimed` grows by `delta`, capped at the
	/// total, and the claimable preview shrinks by the same amount.
	pub(crate) fn fold(&mut self, remote: &RemoteAccount, delta: Balance) {
		if let Some(allocation) = self.allocations.get_mut(remote) {
			*allocation = fold_claimed(allocation, delta);
		}

		if let Some(claimable) = self.claimable.get_mut(remote) {
			*claimable = claimable.saturating_sub(delta);
		}
	}

	pub(crate) fn confirm_association(&mut self, association: Association) {
		self.refresh_association(association.confirm());
		self.eligibility_stale = true;
	}

	pub(crate) fn mark_eligibility_stale(&mut self) {
		self.eligibility_stale = true;
	}
}

#[cfg(test)]
mod tests {
	use sp_runtime::AccountId32;

	use super::*;

	fn remote() -> RemoteAccount {
		RemoteAccount::RelayChain(AccountId32::new([5; 32]))
	}

	#[test]
	fn fold_moves_claimable_into_claimed() {
		let mut cache = AllocationCache::default();
		cache.refresh(remote(), RewardAllocation::new(1000, 10), 200);

		cache.fold(&remote(), 200);

		assert_eq!(cache.allocation(&remote()).map(|a| a.claimed), Some(200));
		assert_eq!(cache.claimable(&remote()), 0);
	}

	#[test]
	fn fold_of_unknown_remote_is_ignored() {
		let mut cache = AllocationCache::default();
		cache.fold(&remote(), 200);

		assert_eq!(cache, AllocationCache::default());
	}

	#[test]
	fn confirming_flags_eligibility_once() {
		let mut cache = AllocationCache::default();
		let reward = AccountId32::new([6; 32]);

		cache.confirm_association(Association::pending(remote(), reward.clone()));

		assert!(cache
			.association(&reward)
			.map(Association::is_confirmed)
			.unwrap_or(false));
		assert!(cache.take_eligibility_stale());
		assert!(!cache.take_eligibility_stale());
	}
}
