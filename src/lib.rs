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

//! # Crowdloan claim client
//!
//! Drives a crowdloan contributor from "connected a wallet" to "rewards
//! received":
//!
//! 1. [`eligibility`] decides whether the connected wallets have anything to
//!    claim and whether an association is still needed.
//! 2. [`proof`] builds the signed proof binding the contributor's relay chain
//!    or Ethereum account to the chosen reward account.
//! 3. [`orchestrator`] submits `associate` or `claim` and follows the
//!    extrinsic until it is finalized.
//! 4. [`vesting`] previews claimable amounts and folds finalized claims into
//!    the local cache.
//!
//! The chain stays the source of truth: nothing cached here is trusted across
//! sessions.

pub mod config;
pub mod eligibility;
pub mod orchestrator;
pub mod proof;
pub mod vesting;

pub use config::ClaimConfiguration;
pub use eligibility::{
	check_eligibility, Eligibility, EligibleClaim, IneligibleReason, WalletConnection,
};
pub use orchestrator::{
	AllocationCache, ClaimError, ClaimOrchestrator, ClaimOutcome, ClaimRequest, ClaimState,
	Resolution, Submission,
};
pub use proof::{build_proof, ProofError, Signers, SignedProof};
pub use vesting::{compute_claimable, fold_claimed, unlocked_at, AssociationProgress};

/// Log target used by every module of this crate.
pub(crate) const LOG_TARGET: &str = "crowdloan-claim";
