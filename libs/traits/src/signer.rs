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
use sp_runtime::AccountId32;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SignerError {
	#[error("Signing request rejected by the user")]
	Rejected,

	#[error("No signing provider available")]
	Unavailable,

	#[error("Signing provider error: {0}")]
	Other(String),
}

/// Raw payload as accepted by the `signRaw` call of relay chain wallet
/// extensions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignRawPayload {
	pub address: AccountId32,
	/// `0x` prefixed hex of the bytes to sign.
	pub data: String,
}

/// Relay chain wallet extension.
#[async_trait]
pub trait RelayChainSigner: Send + Sync {
	/// Sign raw bytes. The extension may wrap them in `<Bytes>..</Bytes>`
	/// before signing. Returns the signature, raw or hex encoded.
	async fn sign_raw(&self, payload: SignRawPayload) -> Result<Vec<u8>, SignerError>;
}

/// Injected EVM provider.
#[async_trait]
pub trait EthereumSigner: Send + Sync {
	/// `personal_sign` the message. Returns the 65 byte signature, raw or
	/// hex encoded.
	async fn sign_message(&self, message: Vec<u8>) -> Result<Vec<u8>, SignerError>;
}

#[cfg(feature = "std")]
pub mod mock {
	use super::*;

	mockall::mock! {
		pub RelaySigner {}

		#[async_trait]
		impl RelayChainSigner for RelaySigner {
			async fn sign_raw(&self, payload: SignRawPayload) -> Result<Vec<u8>, SignerError>;
		}
	}

	mockall::mock! {
		pub EvmSigner {}

		#[async_trait]
		impl EthereumSigner for EvmSigner {
			async fn sign_message(&self, message: Vec<u8>) -> Result<Vec<u8>, SignerError>;
		}
	}
}
