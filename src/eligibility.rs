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

//! Entry guard of the claim flow.
//!
//! Stateless: callers recompute it whenever the connected wallets, the route
//! mode or the on-chain association change.

use std::collections::BTreeMap;

use crowdloan_types::{
	AssociationMode, ClaimMode, EthereumAddress, RemoteAccount, RewardAccount, RewardAllocation,
};

/// Accounts the user currently has connected.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WalletConnection {
	/// Account selected in the relay chain extension. It receives rewards and,
	/// in relay chain mode, is also the contributing account.
	pub reward_account: Option<RewardAccount>,
	/// Account exposed by the injected EVM provider.
	pub ethereum: Option<EthereumAddress>,
}

impl WalletConnection {
	/// Remote accounts the chain should be asked about.
	pub fn candidates(&self) -> Vec<RemoteAccount> {
		self.reward_account
			.iter()
			.cloned()
			.map(RemoteAccount::RelayChain)
			.chain(self.ethereum.iter().copied().map(RemoteAccount::Ethereum))
			.collect()
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IneligibleReason {
	WalletNotConnected,
	WrongAssociationMode,
	NoContribution,
}

impl IneligibleReason {
	pub fn message(&self) -> &'static str {
		match self {
			IneligibleReason::WalletNotConnected => {
				"Connect the wallet holding your crowdloan contribution to continue."
			}
			IneligibleReason::WrongAssociationMode => {
				"The connected wallet contributed through the other crowdloan. Switch the claim mode or connect a different wallet."
			}
			IneligibleReason::NoContribution => {
				"No crowdloan contribution was found for the connected addresses."
			}
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EligibleClaim {
	pub remote: RemoteAccount,
	pub reward_account: RewardAccount,
	pub allocation: RewardAllocation,
	/// `Associate` while no association exists, `Claim` afterwards.
	pub step: ClaimMode,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Eligibility {
	Eligible(EligibleClaim),
	Ineligible(IneligibleReason),
}

/// Decide whether the connected wallets have anything to claim in `mode`.
///
/// `association` is the remote account the reward account is bound to on
/// chain, if any. `contributions` holds the allocations the chain returned for
/// the candidate remote accounts; a zero total counts as no contribution.
pub fn check_eligibility(
	wallet: &WalletConnection,
	mode: AssociationMode,
	association: Option<&RemoteAccount>,
	contributions: &BTreeMap<RemoteAccount, RewardAllocation>,
) -> Eligibility {
	let reward_account = match &wallet.reward_account {
		Some(account) => account.clone(),
		None => return Eligibility::Ineligible(IneligibleReason::WalletNotConnected),
	};

	let contribution = |remote: &RemoteAccount| {
		contributions
			.get(remote)
			.filter(|allocation| allocation.total > 0)
			.copied()
	};

	if let Some(remote) = association {
		if remote.kind() != mode {
			return Eligibility::Ineligible(IneligibleReason::WrongAssociationMode);
		}

		return match contribution(remote) {
			Some(allocation) => Eligibility::Eligible(EligibleClaim {
				remote: remote.clone(),
				reward_account,
				allocation,
				step: ClaimMode::Claim,
			}),
			None => Eligibility::Ineligible(IneligibleReason::NoContribution),
		};
	}

	let remote = match mode {
		AssociationMode::RelayChain => RemoteAccount::RelayChain(reward_account.clone()),
		AssociationMode::Ethereum => match wallet.ethereum {
			Some(address) => RemoteAccount::Ethereum(address),
			None => return Eligibility::Ineligible(IneligibleReason::WalletNotConnected),
		},
	};

	if let Some(allocation) = contribution(&remote) {
		return Eligibility::Eligible(EligibleClaim {
			remote,
			reward_account,
			allocation,
			step: ClaimMode::Associate,
		});
	}

	let other_mode_contributed = wallet
		.candidates()
		.iter()
		.any(|candidate| candidate.kind() != mode && contribution(candidate).is_some());

	if other_mode_contributed {
		Eligibility::Ineligible(IneligibleReason::WrongAssociationMode)
	} else {
		Eligibility::Ineligible(IneligibleReason::NoContribution)
	}
}
