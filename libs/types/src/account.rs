// Copyright 2023 Centrifuge Foundation (centrifuge.io).
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
use sp_runtime::{AccountId32, RuntimeDebug};

/// Destination account on the target chain that receives unlocked rewards.
pub type RewardAccount = AccountId32;

/// A 20 byte Ethereum address.
#[derive(
	Encode,
	Decode,
	Clone,
	Copy,
	Default,
	Eq,
	MaxEncodedLen,
	Ord,
	PartialEq,
	PartialOrd,
	RuntimeDebug,
	TypeInfo,
)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize, Hash))]
pub struct EthereumAddress(pub [u8; 20]);

impl From<[u8; 20]> for EthereumAddress {
	fn from(address: [u8; 20]) -> Self {
		EthereumAddress(address)
	}
}

impl AsRef<[u8]> for EthereumAddress {
	fn as_ref(&self) -> &[u8] {
		&self.0[..]
	}
}

/// Which kind of remote account a claim flow operates on.
#[derive(Encode, Decode, Clone, Copy, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize, Hash))]
pub enum AssociationMode {
	/// Contribution made from a relay chain account.
	RelayChain,
	/// Contribution made from an Ethereum account.
	Ethereum,
}

/// The contributor's identity on the chain the contribution was made from.
///
/// Ordered so it can key the client's allocation cache.
#[derive(Encode, Decode, Clone, Eq, MaxEncodedLen, Ord, PartialEq, PartialOrd, RuntimeDebug, TypeInfo)]
pub enum RemoteAccount {
	RelayChain(AccountId32),
	Ethereum(EthereumAddress),
}

impl RemoteAccount {
	pub fn kind(&self) -> AssociationMode {
		match self {
			RemoteAccount::RelayChain(_) => AssociationMode::RelayChain,
			RemoteAccount::Ethereum(_) => AssociationMode::Ethereum,
		}
	}
}

#[derive(Encode, Decode, Clone, Copy, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
pub enum AssociationStatus {
	/// The association extrinsic was submitted but is not finalized yet.
	Pending,
	/// The chain finalized the association. It never reverts.
	Confirmed,
}

/// One-time binding of a remote account to a reward account.
#[derive(Encode, Decode, Clone, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
pub struct Association {
	pub remote: RemoteAccount,
	pub reward_account: RewardAccount,
	pub status: AssociationStatus,
}

impl Association {
	pub fn pending(remote: RemoteAccount, reward_account: RewardAccount) -> Self {
		Self {
			remote,
			reward_account,
			status: AssociationStatus::Pending,
		}
	}

	pub fn confirm(self) -> Self {
		Self {
			status: AssociationStatus::Confirmed,
			..self
		}
	}

	pub fn is_confirmed(&self) -> bool {
		self.status == AssociationStatus::Confirmed
	}
}

#[cfg(test)]
mod tests {
	use hex_literal::hex;

	use super::*;

	#[test]
	fn remote_account_kind() {
		let relay = RemoteAccount::RelayChain(AccountId32::new([1; 32]));
		let eth = RemoteAccount::Ethereum(EthereumAddress(hex!(
			"d47ed02acbbb66ee8a3fe0275bd98add0aa607c3"
		)));

		assert_eq!(relay.kind(), AssociationMode::RelayChain);
		assert_eq!(eth.kind(), AssociationMode::Ethereum);
	}

	#[test]
	fn remote_account_encoding_is_tagged() {
		let eth = RemoteAccount::Ethereum(EthereumAddress([7; 20]));
		let encoded = eth.encode();

		assert_eq!(encoded[0], 1);
		assert_eq!(encoded.len(), 21);
		assert_eq!(RemoteAccount::decode(&mut &encoded[..]).ok(), Some(eth));
	}

	#[test]
	fn confirming_keeps_the_binding() {
		let remote = RemoteAccount::RelayChain(AccountId32::new([2; 32]));
		let reward = AccountId32::new([3; 32]);
		let association = Association::pending(remote.clone(), reward.clone());

		assert!(!association.is_confirmed());

		let confirmed = association.confirm();
		assert!(confirmed.is_confirmed());
		assert_eq!(confirmed.remote, remote);
		assert_eq!(confirmed.reward_account, reward);
	}
}
