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
use sp_runtime::{AccountId32, MultiSignature, RuntimeDebug};

/// Recoverable secp256k1 signature, `r ++ s ++ v`.
#[derive(Encode, Decode, Clone, Copy, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
pub struct EcdsaSignature(pub [u8; 65]);

impl AsRef<[u8]> for EcdsaSignature {
	fn as_ref(&self) -> &[u8] {
		&self.0[..]
	}
}

/// Proof payload carried by the unsigned `associate` extrinsic.
#[derive(Encode, Decode, Clone, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub enum Proof {
	/// The relay chain account and its signature over the challenge.
	RelayChain(AccountId32, MultiSignature),
	/// A personal-message signature; the signer is recovered from it.
	Ethereum(EcdsaSignature),
}

impl Proof {
	/// Scheme of the wrapped signature, `None` for relay signatures other than
	/// sr25519.
	pub fn scheme(&self) -> Option<SignatureScheme> {
		match self {
			Proof::RelayChain(_, MultiSignature::Sr25519(_)) => Some(SignatureScheme::Sr25519),
			Proof::RelayChain(..) => None,
			Proof::Ethereum(_) => Some(SignatureScheme::Ethereum),
		}
	}
}

#[derive(Encode, Decode, Clone, Copy, Eq, MaxEncodedLen, PartialEq, RuntimeDebug, TypeInfo)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
pub enum SignatureScheme {
	Sr25519,
	Ethereum,
}

impl SignatureScheme {
	/// Length in bytes of a signature produced under this scheme.
	pub const fn signature_len(&self) -> usize {
		match self {
			SignatureScheme::Sr25519 => 64,
			SignatureScheme::Ethereum => 65,
		}
	}
}

#[cfg(test)]
mod tests {
	use sp_core::sr25519;

	use super::*;

	#[test]
	fn scheme_follows_payload() {
		let relay = Proof::RelayChain(
			AccountId32::new([1; 32]),
			MultiSignature::Sr25519(sr25519::Signature::from_raw([0; 64])),
		);
		let eth = Proof::Ethereum(EcdsaSignature([0; 65]));

		assert_eq!(relay.scheme(), Some(SignatureScheme::Sr25519));
		assert_eq!(eth.scheme(), Some(SignatureScheme::Ethereum));
		assert_eq!(
			SignatureScheme::Sr25519.signature_len() + 1,
			SignatureScheme::Ethereum.signature_len()
		);
	}
}
