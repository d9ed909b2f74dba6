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

use crowdloan_types::{Association, Balance, ClaimMode, RemoteAccount, RewardAccount};
use sp_core::H256;

use crate::proof::SignedProof;

/// The single in-flight claim or association, owned by the orchestrator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimSession {
	pub mode: ClaimMode,
	pub remote: RemoteAccount,
	pub reward_account: RewardAccount,
	pub proof: Option<SignedProof>,
	/// Preview of what finalization pays out, used when the chain does not
	/// report the claimed amount.
	pub expected_delta: Balance,
	pub tx_hash: Option<H256>,
	pub processing_notified: bool,
}

impl ClaimSession {
	pub fn new(
		mode: ClaimMode,
		remote: RemoteAccount,
		reward_account: RewardAccount,
		expected_delta: Balance,
	) -> Self {
		Self {
			mode,
			remote,
			reward_account,
			proof: None,
			expected_delta,
			tx_hash: None,
			processing_notified: false,
		}
	}

	/// Association this session creates; `None` for plain claims.
	pub fn association(&self) -> Option<Association> {
		match self.mode {
			ClaimMode::Associate => Some(Association::pending(
				self.remote.clone(),
				self.reward_account.clone(),
			)),
			ClaimMode::Claim => None,
		}
	}

	pub fn is_watching(&self, tx_hash: &H256) -> bool {
		self.tx_hash.as_ref() == Some(tx_hash)
	}
}
