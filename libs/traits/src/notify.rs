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

use crowdloan_types::{Balance, ClaimMode};
use sp_core::H256;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notification {
	/// The extrinsic left the client. Sent at most once per submission and
	/// always before `Finalized`.
	Processing {
		mode: ClaimMode,
		tx_hash: H256,
		explorer_url: Option<String>,
	},
	/// The session completed. `tx_hash` is `None` when nothing was submitted.
	Finalized {
		mode: ClaimMode,
		tx_hash: Option<H256>,
		delta: Balance,
		explorer_url: Option<String>,
	},
	Failed {
		message: String,
	},
	/// A finalized association changed what the user is eligible for.
	EligibilityChanged,
}

/// Sink for user-facing progress of a claim session.
pub trait ClaimNotifier: Send + Sync {
	fn notify(&self, notification: Notification);
}

#[cfg(feature = "std")]
pub mod mock {
	use super::*;

	mockall::mock! {
		pub Notifier {}

		impl ClaimNotifier for Notifier {
			fn notify(&self, notification: Notification);
		}
	}
}
