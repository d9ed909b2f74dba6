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

//! Association proofs.
//!
//! The contributor proves control of the remote account by signing a
//! challenge derived from the reward account only:
//!
//! ```text
//! challenge = prefix ++ hex(SCALE(reward_account))
//! ```
//!
//! Relay chain wallets sign it raw, possibly wrapped in `<Bytes>..</Bytes>`.
//! Ethereum wallets sign it as a personal message, so the chain recovers the
//! signer from the signature instead of receiving the address.

// ----------------------------------------------------------------------------
// Imports and dependencies
// ----------------------------------------------------------------------------

use codec::Encode;
use crowdloan_traits::{EthereumSigner, RelayChainSigner, SignRawPayload, SignerError};
use crowdloan_types::{
	EcdsaSignature, EthereumAddress, Proof, RemoteAccount, RewardAccount, SignatureScheme,
};
use crowdloan_utils::{decode_fixed, normalize_bytes, to_prefixed_hex};
use sp_core::sr25519;
use sp_io::{crypto::secp256k1_ecdsa_recover, hashing::keccak_256};
use sp_runtime::{traits::Verify, AccountId32, MultiSignature};

use crate::LOG_TARGET;

// ----------------------------------------------------------------------------
// Types and constants
// ----------------------------------------------------------------------------

/// Prefix that polkadot-js extension prepends our signed bytes into.
/// See: https://github.com/polkadot-js/common/blob/v7.6.1/packages/util/src/u8a/wrap.ts
const PRE_FIX: &[u8] = b"<Bytes>";

/// Postfix that polkadot-js extension postpends our signed bytes into.
const POST_FIX: &[u8] = b"</Bytes>";

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ProofError {
	#[error("No wallet able to sign for this account is connected")]
	SigningUnavailable,

	#[error("Signing request rejected by the user")]
	UserRejected,

	#[error("Wallet returned {actual} bytes, a {expected:?} signature has {}", .expected.signature_len())]
	SignatureSchemeMismatch {
		expected: SignatureScheme,
		actual: usize,
	},

	#[error("Signing failed: {0}")]
	SigningFailed(String),

	#[error("Signature does not match the contributing account")]
	WrongAddress,
}

impl From<SignerError> for ProofError {
	fn from(error: SignerError) -> Self {
		match error {
			SignerError::Rejected => ProofError::UserRejected,
			SignerError::Unavailable => ProofError::SigningUnavailable,
			SignerError::Other(reason) => ProofError::SigningFailed(reason),
		}
	}
}

/// Wallets the user connected. Either may be missing.
#[derive(Default)]
pub struct Signers {
	pub relay: Option<Box<dyn RelayChainSigner>>,
	pub ethereum: Option<Box<dyn EthereumSigner>>,
}

/// A proof ready to be submitted, with the challenge it signs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedProof {
	pub remote: RemoteAccount,
	pub challenge: Vec<u8>,
	pub proof: Proof,
}

impl SignedProof {
	pub fn scheme(&self) -> Option<SignatureScheme> {
		self.proof.scheme()
	}
}

// ----------------------------------------------------------------------------
// Challenge
// ----------------------------------------------------------------------------

/// Hex of the SCALE encoded reward account, the variable part of the
/// challenge.
pub fn reward_message(reward_account: &RewardAccount) -> Vec<u8> {
	hex::encode(reward_account.encode()).into_bytes()
}

pub fn challenge(prefix: &str, reward_account: &RewardAccount) -> Vec<u8> {
	[prefix.as_bytes(), &reward_message(reward_account)].concat()
}

// ----------------------------------------------------------------------------
// Proof building
// ----------------------------------------------------------------------------

/// Ask the wallet matching `remote` to sign the association challenge.
pub async fn build_proof(
	prefix: &str,
	remote: &RemoteAccount,
	reward_account: &RewardAccount,
	signers: &Signers,
) -> Result<SignedProof, ProofError> {
	let challenge = challenge(prefix, reward_account);

	log::info!(
		target: LOG_TARGET,
		"Requesting {:?} association signature",
		remote.kind(),
	);

	let proof = match remote {
		RemoteAccount::RelayChain(account) => {
			let signer = signers
				.relay
				.as_ref()
				.ok_or(ProofError::SigningUnavailable)?;

			let raw = signer
				.sign_raw(SignRawPayload {
					address: account.clone(),
					data: to_prefixed_hex(&challenge),
				})
				.await?;

			let signature = decode_signature::<64>(&raw, SignatureScheme::Sr25519)?;

			Proof::RelayChain(
				account.clone(),
				MultiSignature::Sr25519(sr25519::Signature::from_raw(signature)),
			)
		}
		RemoteAccount::Ethereum(_) => {
			let signer = signers
				.ethereum
				.as_ref()
				.ok_or(ProofError::SigningUnavailable)?;

			let raw = signer.sign_message(challenge.clone()).await?;

			Proof::Ethereum(EcdsaSignature(decode_signature::<65>(
				&raw,
				SignatureScheme::Ethereum,
			)?))
		}
	};

	Ok(SignedProof {
		remote: remote.clone(),
		challenge,
		proof,
	})
}

fn decode_signature<const S: usize>(
	raw: &[u8],
	expected: SignatureScheme,
) -> Result<[u8; S], ProofError> {
	decode_fixed::<S>(raw).ok_or_else(|| ProofError::SignatureSchemeMismatch {
		expected,
		actual: normalize_bytes(raw).len(),
	})
}

// ----------------------------------------------------------------------------
// Verification
// ----------------------------------------------------------------------------

/// Check a relay chain signature over the challenge, bare or wrapped the way
/// polkadot-js extensions wrap raw payloads.
pub fn verify_relay(
	prefix: &str,
	reward_account: &RewardAccount,
	relay_account: &AccountId32,
	signature: &MultiSignature,
) -> bool {
	let payload = challenge(prefix, reward_account);
	let wrapped = [PRE_FIX, &payload, POST_FIX].concat();

	signature.verify(payload.as_slice(), relay_account) ||
		signature.verify(wrapped.as_slice(), relay_account)
}

/// `personal_sign` framing of `prefix ++ msg`.
pub fn ethereum_signable_message(prefix: &[u8], msg: &[u8]) -> Vec<u8> {
	let mut length = prefix.len() + msg.len();
	let mut digits = Vec::new();
	loop {
		digits.push(b'0' + (length % 10) as u8);
		length /= 10;
		if length == 0 {
			break;
		}
	}

	let mut v = b"\x19Ethereum Signed Message:\n".to_vec();
	v.extend(digits.into_iter().rev());
	v.extend_from_slice(prefix);
	v.extend_from_slice(msg);
	v
}

/// Recover the address that personal-signed `prefix ++ msg`.
pub fn ethereum_recover(
	prefix: &[u8],
	msg: &[u8],
	signature: &EcdsaSignature,
) -> Option<EthereumAddress> {
	let digest = keccak_256(&ethereum_signable_message(prefix, msg));
	let public = secp256k1_ecdsa_recover(&signature.0, &digest).ok()?;

	let mut address = EthereumAddress::default();
	address
		.0
		.copy_from_slice(&keccak_256(&public[..])[12..]);
	Some(address)
}

/// Run the pallet's proof check locally so a proof made by the wrong wallet
/// never reaches the chain.
pub fn verify_proof(
	prefix: &str,
	reward_account: &RewardAccount,
	signed: &SignedProof,
) -> Result<(), ProofError> {
	let valid = match (&signed.remote, &signed.proof) {
		(RemoteAccount::RelayChain(expected), Proof::RelayChain(account, signature)) => {
			expected == account && verify_relay(prefix, reward_account, account, signature)
		}
		(RemoteAccount::Ethereum(expected), Proof::Ethereum(signature)) => {
			ethereum_recover(
				prefix.as_bytes(),
				&reward_message(reward_account),
				signature,
			)
			.as_ref() == Some(expected)
		}
		_ => false,
	};

	if valid {
		Ok(())
	} else {
		log::warn!(
			target: LOG_TARGET,
			"Association proof does not bind {:?}",
			signed.remote,
		);
		Err(ProofError::WrongAddress)
	}
}

#[cfg(test)]
mod tests {
	use crowdloan_traits::signer::mock::{MockEvmSigner, MockRelaySigner};
	use sp_core::{ecdsa, Pair};
	use sp_keyring::AccountKeyring;

	use super::*;

	const PREFIX: &str = "picasso-";

	fn reward_account() -> RewardAccount {
		AccountKeyring::Bob.to_account_id()
	}

	fn relay_pair() -> sr25519::Pair {
		AccountKeyring::Alice.pair()
	}

	fn eth_pair() -> ecdsa::Pair {
		ecdsa::Pair::from_string("//Charlie", None).expect("valid dev seed")
	}

	fn eth_address(pair: &ecdsa::Pair) -> EthereumAddress {
		let digest = [7u8; 32];
		let signature = pair.sign_prehashed(&digest);
		let public = secp256k1_ecdsa_recover(&signature.0, &digest).ok().expect("recoverable");

		let mut address = EthereumAddress::default();
		address.0.copy_from_slice(&keccak_256(&public[..])[12..]);
		address
	}

	fn eth_sign(pair: &ecdsa::Pair, message: &[u8]) -> [u8; 65] {
		let digest = keccak_256(&ethereum_signable_message(&[], message));
		pair.sign_prehashed(&digest).0
	}

	fn relay_signer(wrap: bool) -> MockRelaySigner {
		let mut signer = MockRelaySigner::new();
		signer.expect_sign_raw().returning(move |payload| {
			let data = normalize_bytes(payload.data.as_bytes());
			let data = if wrap {
				[PRE_FIX, &data, POST_FIX].concat()
			} else {
				data
			};
			Ok(to_prefixed_hex(relay_pair().sign(&data)).into_bytes())
		});
		signer
	}

	#[test]
	fn challenge_depends_on_reward_account_only() {
		let first = challenge(PREFIX, &reward_account());
		let second = challenge(PREFIX, &reward_account());

		assert_eq!(first, second);
		assert!(first.starts_with(b"picasso-"));
		assert_eq!(first.len(), PREFIX.len() + 64);
		assert_ne!(
			first,
			challenge(PREFIX, &AccountKeyring::Dave.to_account_id())
		);
	}

	#[test]
	fn challenge_is_prefixed_lowercase_hex() {
		let account = AccountId32::new(hex_literal::hex!(
			"d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d"
		));

		assert_eq!(
			challenge(PREFIX, &account),
			b"picasso-d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d".to_vec()
		);
	}

	#[test]
	fn signable_message_has_decimal_length() {
		assert_eq!(
			ethereum_signable_message(b"picasso-", b"ab"),
			b"\x19Ethereum Signed Message:\n10picasso-ab".to_vec()
		);
		assert_eq!(
			ethereum_signable_message(&[], &[]),
			b"\x19Ethereum Signed Message:\n0".to_vec()
		);
	}

	#[tokio::test]
	async fn relay_proof_verifies_bare_and_wrapped() {
		let remote = RemoteAccount::RelayChain(relay_pair().public().into());

		for wrap in [false, true] {
			let signers = Signers {
				relay: Some(Box::new(relay_signer(wrap))),
				ethereum: None,
			};

			let signed = build_proof(PREFIX, &remote, &reward_account(), &signers)
				.await
				.expect("signer answers");

			assert_eq!(signed.scheme(), Some(SignatureScheme::Sr25519));
			assert_eq!(signed.challenge, challenge(PREFIX, &reward_account()));
			assert_eq!(verify_proof(PREFIX, &reward_account(), &signed), Ok(()));
		}
	}

	#[tokio::test]
	async fn same_input_signs_same_challenge() {
		let remote = RemoteAccount::RelayChain(relay_pair().public().into());
		let signers = Signers {
			relay: Some(Box::new(relay_signer(false))),
			ethereum: None,
		};

		let first = build_proof(PREFIX, &remote, &reward_account(), &signers)
			.await
			.expect("signer answers");
		let second = build_proof(PREFIX, &remote, &reward_account(), &signers)
			.await
			.expect("signer answers");

		// sr25519 signatures are randomized, the signed message is not.
		assert_eq!(first.challenge, second.challenge);
		assert_eq!(verify_proof(PREFIX, &reward_account(), &first), Ok(()));
		assert_eq!(verify_proof(PREFIX, &reward_account(), &second), Ok(()));
	}

	#[tokio::test]
	async fn relay_proof_from_other_key_is_wrong_address() {
		let remote = RemoteAccount::RelayChain(AccountKeyring::Ferdie.to_account_id());
		let signers = Signers {
			relay: Some(Box::new(relay_signer(false))),
			ethereum: None,
		};

		let signed = build_proof(PREFIX, &remote, &reward_account(), &signers)
			.await
			.expect("signer answers");

		assert_eq!(
			verify_proof(PREFIX, &reward_account(), &signed),
			Err(ProofError::WrongAddress)
		);
	}

	#[tokio::test]
	async fn ethereum_proof_recovers_signer() {
		let pair = eth_pair();
		let remote = RemoteAccount::Ethereum(eth_address(&pair));

		let mut signer = MockEvmSigner::new();
		signer
			.expect_sign_message()
			.withf(|message| message.starts_with(b"picasso-"))
			.times(1)
			.returning(move |message| Ok(eth_sign(&pair, &message).to_vec()));

		let signers = Signers {
			relay: None,
			ethereum: Some(Box::new(signer)),
		};

		let signed = build_proof(PREFIX, &remote, &reward_account(), &signers)
			.await
			.expect("signer answers");

		assert_eq!(signed.scheme(), Some(SignatureScheme::Ethereum));
		assert_eq!(verify_proof(PREFIX, &reward_account(), &signed), Ok(()));
		assert_eq!(
			verify_proof(PREFIX, &AccountKeyring::Eve.to_account_id(), &signed),
			Err(ProofError::WrongAddress)
		);
	}

	#[tokio::test]
	async fn missing_signer_is_unavailable() {
		let remote = RemoteAccount::Ethereum(EthereumAddress([1; 20]));
		let signers = Signers {
			relay: Some(Box::new(MockRelaySigner::new())),
			ethereum: None,
		};

		assert_eq!(
			build_proof(PREFIX, &remote, &reward_account(), &signers).await,
			Err(ProofError::SigningUnavailable)
		);
	}

	#[tokio::test]
	async fn signer_errors_are_mapped() {
		let remote = RemoteAccount::RelayChain(relay_pair().public().into());

		for (error, expected) in [
			(SignerError::Rejected, ProofError::UserRejected),
			(SignerError::Unavailable, ProofError::SigningUnavailable),
			(
				SignerError::Other("locked".into()),
				ProofError::SigningFailed("locked".into()),
			),
		] {
			let mut signer = MockRelaySigner::new();
			signer.expect_sign_raw().returning(move |_| Err(error.clone()));

			let signers = Signers {
				relay: Some(Box::new(signer)),
				ethereum: None,
			};

			assert_eq!(
				build_proof(PREFIX, &remote, &reward_account(), &signers).await,
				Err(expected)
			);
		}
	}

	#[tokio::test]
	async fn ecdsa_signature_from_relay_wallet_is_a_scheme_mismatch() {
		let remote = RemoteAccount::RelayChain(relay_pair().public().into());

		let mut signer = MockRelaySigner::new();
		signer
			.expect_sign_raw()
			.returning(|_| Ok(to_prefixed_hex([1u8; 65]).into_bytes()));

		let signers = Signers {
			relay: Some(Box::new(signer)),
			ethereum: None,
		};

		assert_eq!(
			build_proof(PREFIX, &remote, &reward_account(), &signers).await,
			Err(ProofError::SignatureSchemeMismatch {
				expected: SignatureScheme::Sr25519,
				actual: 65,
			})
		);
	}
}
