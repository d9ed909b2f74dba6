// Copyright 2021 Centrifuge Foundation (centrifuge.io).
// This file is part of Centrifuge chain project.

// Centrifuge is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version (see http://www.gnu.org/licenses).

// Centrifuge is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

use async_trait::async_trait;
use crowdloan_types::{
	Balance, Proof, RemoteAccount, RewardAccount, RewardAllocation, RewardsError, ValidityError,
	VestingSchedule,
};
use sp_core::H256;
use sp_runtime::{transaction_validity::TransactionValidityError, Perbill};

use crate::signer::SignerError;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ChainError {
	#[error("Transaction refused by the pool: {0:?}")]
	InvalidTransaction(ValidityError),

	#[error("Extrinsic failed: {0:?}")]
	Dispatch(RewardsError),

	#[error("Extrinsic signing failed: {0}")]
	Signing(#[from] SignerError),

	#[error("RPC error: {0}")]
	Rpc(String),
}

/// Pool rejections carrying a rewards pallet code keep it, any other pool
/// rejection is reported as is.
impl From<TransactionValidityError> for ChainError {
	fn from(error: TransactionValidityError) -> Self {
		match ValidityError::from_validity(&error) {
			Some(code) => ChainError::InvalidTransaction(code),
			None => ChainError::Rpc(format!("transaction pool: {:?}", error)),
		}
	}
}

impl ChainError {
	/// Rejections the chain raises for a request that already took effect.
	///
	/// A second association of the same remote account and a claim with
	/// nothing unlocked both end here.
	pub fn is_benign(&self) -> bool {
		matches!(
			self,
			ChainError::InvalidTransaction(ValidityError::AlreadyAssociated)
				| ChainError::Dispatch(RewardsError::AlreadyAssociated)
				| ChainError::Dispatch(RewardsError::NothingToClaim)
		)
	}

	/// Rejections caused by a proof that does not bind the expected account,
	/// or by a remote account without any contribution.
	pub fn is_wrong_address(&self) -> bool {
		matches!(
			self,
			ChainError::InvalidTransaction(ValidityError::InvalidProof)
				| ChainError::InvalidTransaction(ValidityError::NoReward)
				| ChainError::Dispatch(RewardsError::InvalidProof)
		)
	}
}

/// Read and write access to the crowdloan rewards pallet.
///
/// The chain is the source of truth for every value returned here; callers
/// re-query on each session start.
#[async_trait]
pub trait CrowdloanRewardsApi: Send + Sync {
	/// Remote account the given reward account is associated with.
	async fn association(
		&self,
		reward_account: &RewardAccount,
	) -> Result<Option<RemoteAccount>, ChainError>;

	async fn reward(&self, remote: &RemoteAccount) -> Result<Option<RewardAllocation>, ChainError>;

	/// Amount unlocked and not yet claimed for an associated reward account.
	async fn available_to_claim(&self, reward_account: &RewardAccount)
		-> Result<Balance, ChainError>;

	/// Share of the total paid out on association.
	async fn initial_payment(&self) -> Result<Perbill, ChainError>;

	async fn vesting_schedule(&self) -> Result<VestingSchedule, ChainError>;

	/// Submit the unsigned `associate(reward_account, proof)` extrinsic.
	async fn submit_associate(
		&self,
		reward_account: RewardAccount,
		proof: Proof,
	) -> Result<H256, ChainError>;

	/// Sign with the reward account and submit `claim()`.
	async fn submit_claim(&self, reward_account: RewardAccount) -> Result<H256, ChainError>;
}

/// Lifecycle milestones of a submitted extrinsic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransactionEvent {
	Broadcast(H256),
	InBlock(H256),
	/// Finalized successfully. `claimed` carries the amount from the pallet's
	/// `Claimed` event when the watcher decoded one.
	Finalized {
		tx_hash: H256,
		claimed: Option<Balance>,
	},
	Error {
		tx_hash: H256,
		error: ChainError,
	},
}

impl TransactionEvent {
	pub fn tx_hash(&self) -> H256 {
		match self {
			TransactionEvent::Broadcast(hash) | TransactionEvent::InBlock(hash) => *hash,
			TransactionEvent::Finalized { tx_hash, .. } | TransactionEvent::Error { tx_hash, .. } => {
				*tx_hash
			}
		}
	}
}

#[cfg(feature = "std")]
pub mod mock {
	use super::*;

	mockall::mock! {
		pub RewardsApi {}

		#[async_trait]
		impl CrowdloanRewardsApi for RewardsApi {
			async fn association(
				&self,
				reward_account: &RewardAccount,
			) -> Result<Option<RemoteAccount>, ChainError>;
			async fn reward(&self, remote: &RemoteAccount) -> Result<Option<RewardAllocation>, ChainError>;
			async fn available_to_claim(&self, reward_account: &RewardAccount) -> Result<Balance, ChainError>;
			async fn initial_payment(&self) -> Result<Perbill, ChainError>;
			async fn vesting_schedule(&self) -> Result<VestingSchedule, ChainError>;
			async fn submit_associate(
				&self,
				reward_account: RewardAccount,
				proof: Proof,
			) -> Result<H256, ChainError>;
			async fn submit_claim(&self, reward_account: RewardAccount) -> Result<H256, ChainError>;
		}
	}
}

#[cfg(test)]
mod tests {
	use sp_runtime::AccountId32;

	use super::{mock::MockRewardsApi, *};

	#[test]
	fn benign_and_wrong_address_are_disjoint() {
		let errors = [
			ChainError::InvalidTransaction(ValidityError::InvalidProof),
			ChainError::InvalidTransaction(ValidityError::NoReward),
			ChainError::InvalidTransaction(ValidityError::AlreadyAssociated),
			ChainError::InvalidTransaction(ValidityError::NotClaimableYet),
			ChainError::Dispatch(RewardsError::InvalidProof),
			ChainError::Dispatch(RewardsError::NothingToClaim),
			ChainError::Dispatch(RewardsError::AlreadyAssociated),
			ChainError::Rpc("connection reset".into()),
		];

		for error in errors {
			assert!(!(error.is_benign() && error.is_wrong_address()), "{error}");
		}

		assert!(ChainError::Dispatch(RewardsError::NothingToClaim).is_benign());
		assert!(!ChainError::InvalidTransaction(ValidityError::NotClaimableYet).is_benign());
		assert!(!ChainError::Signing(SignerError::Rejected).is_wrong_address());
	}

	#[test]
	fn pool_rejections_keep_pallet_codes() {
		use sp_runtime::transaction_validity::InvalidTransaction;

		assert_eq!(
			ChainError::from(TransactionValidityError::Invalid(
				InvalidTransaction::Custom(0)
			)),
			ChainError::InvalidTransaction(ValidityError::InvalidProof)
		);
		assert!(matches!(
			ChainError::from(TransactionValidityError::Invalid(InvalidTransaction::Stale)),
			ChainError::Rpc(_)
		));
		assert!(matches!(
			ChainError::from(TransactionValidityError::Invalid(
				InvalidTransaction::Custom(42)
			)),
			ChainError::Rpc(_)
		));
	}

	#[test]
	fn event_hash() {
		let hash = H256::repeat_byte(4);

		assert_eq!(TransactionEvent::InBlock(hash).tx_hash(), hash);
		assert_eq!(
			TransactionEvent::Finalized {
				tx_hash: hash,
				claimed: None
			}
			.tx_hash(),
			hash
		);
	}

	#[test]
	fn mock_answers_queries() {
		let mut api = MockRewardsApi::new();
		api.expect_available_to_claim()
			.withf(|account| account == &AccountId32::new([1; 32]))
			.returning(|_| Ok(42));

		let available =
			futures::executor::block_on(api.available_to_claim(&AccountId32::new([1; 32])));

		assert_eq!(available, Ok(42));
	}
}
