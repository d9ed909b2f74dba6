// Copyright 2021 Centrifuge GmbH (centrifuge.io).
// This file is part of Centrifuge chain project.

// Centrifuge is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version (see http://www.gnu.org/licenses).

// Centrifuge is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

//! # Collaborator traits for the crowdloan claim client
//!
//! The claim workflow talks to three outside parties: the chain (reads and
//! extrinsic submission), the wallet (signatures) and whoever renders
//! progress to the user. Each is a trait here so the workflow can be driven
//! by mocks in tests.

/// Chain reads, submissions and transaction lifecycle events.
pub mod chain;
/// Progress notifications.
pub mod notify;
/// Wallet signing providers.
pub mod signer;

pub use chain::{ChainError, CrowdloanRewardsApi, TransactionEvent};
pub use notify::{ClaimNotifier, Notification};
pub use signer::{EthereumSigner, RelayChainSigner, SignRawPayload, SignerError};
