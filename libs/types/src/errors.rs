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
use sp_runtime::{
	transaction_validity::{InvalidTransaction, TransactionValidityError},
	RuntimeDebug,
};

/// Custom codes the rewards pallet attaches to `InvalidTransaction::Custom`
/// when the pool refuses an unsigned `associate`.
#[derive(Encode, Decode, Clone, Copy, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
#[repr(u8)]
pub enum ValidityError {
	InvalidProof = 0,
	NoReward = 1,
	AlreadyAssociated = 2,
	NotClaimableYet = 3,
}

impl TryFrom<u8> for ValidityError {
	type Error = u8;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		match code {
			0 => Ok(ValidityError::InvalidProof),
			1 => Ok(ValidityError::NoReward),
			2 => Ok(ValidityError::AlreadyAssociated),
			3 => Ok(ValidityError::NotClaimableYet),
			other => Err(other),
		}
	}
}

impl ValidityError {
	/// Extracts the pallet code from a pool rejection, if it carries one.
	pub fn from_validity(error: &TransactionValidityError) -> Option<Self> {
		match error {
			TransactionValidityError::Invalid(InvalidTransaction::Custom(code)) => {
				Self::try_from(*code).ok()
			}
			_ => None,
		}
	}
}

/// Dispatch errors of the rewards pallet, in declaration order so the
/// `ModuleError` index decodes straight into it.
#[derive(Encode, Decode, Clone, Copy, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
pub enum RewardsError {
	NotInitialized,
	AlreadyInitialized,
	BackToTheFuture,
	RewardsNotFunded,
	InvalidProof,
	InvalidClaim,
	NothingToClaim,
	NotAssociated,
	AlreadyAssociated,
	NotClaimableYet,
}
