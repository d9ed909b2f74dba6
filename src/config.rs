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

use std::time::Duration;

/// Prefix the rewards pallet prepends to the hex encoded reward account
/// before checking a proof.
pub const DEFAULT_PROOF_PREFIX: &str = "picasso-";

/// The claim client configuration, meant to be flattened into the CLI of the
/// host binary.
#[derive(Clone, Debug, clap::Parser)]
pub struct ClaimConfiguration {
	/// Prefix of the association challenge. Must match the runtime.
	#[clap(long = "crowdloan-proof-prefix", default_value = DEFAULT_PROOF_PREFIX)]
	pub proof_prefix: String,

	/// Seconds to wait for the wallet to answer a signing prompt.
	#[clap(long = "crowdloan-signing-timeout-secs", default_value = "120")]
	pub signing_timeout_secs: u64,

	/// Seconds to wait for a submitted extrinsic to be finalized.
	#[clap(long = "crowdloan-finalization-timeout-secs", default_value = "300")]
	pub finalization_timeout_secs: u64,

	/// Block explorer base URL; the `0x` transaction hash is appended to it.
	#[clap(long = "crowdloan-explorer-url")]
	pub explorer_url: Option<String>,
}

impl ClaimConfiguration {
	pub fn signing_timeout(&self) -> Duration {
		Duration::from_secs(self.signing_timeout_secs)
	}

	pub fn finalization_timeout(&self) -> Duration {
		Duration::from_secs(self.finalization_timeout_secs)
	}

	pub fn explorer_link(&self, tx_hash: &sp_core::H256) -> Option<String> {
		self.explorer_url
			.as_ref()
			.map(|base| format!("{}{}", base, crowdloan_utils::to_prefixed_hex(tx_hash)))
	}
}

impl Default for ClaimConfiguration {
	fn default() -> Self {
		Self {
			proof_prefix: DEFAULT_PROOF_PREFIX.into(),
			signing_timeout_secs: 120,
			finalization_timeout_secs: 300,
			explorer_url: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use clap::Parser;
	use sp_core::H256;

	use super::*;

	#[test]
	fn cli_defaults_match_default() {
		let parsed = ClaimConfiguration::parse_from(["claim"]);
		let default = ClaimConfiguration::default();

		assert_eq!(parsed.proof_prefix, default.proof_prefix);
		assert_eq!(parsed.signing_timeout(), default.signing_timeout());
		assert_eq!(parsed.finalization_timeout(), default.finalization_timeout());
		assert_eq!(parsed.explorer_url, None);
	}

	#[test]
	fn explorer_link_appends_hash() {
		let config = ClaimConfiguration::parse_from([
			"claim",
			"--crowdloan-explorer-url",
			"https://picasso.subscan.io/extrinsic/",
		]);

		assert_eq!(
			config.explorer_link(&H256::repeat_byte(0xab)),
			Some(format!("https://picasso.subscan.io/extrinsic/0x{}", "ab".repeat(32)))
		);
		assert_eq!(ClaimConfiguration::default().explorer_link(&H256::zero()), None);
	}
}
