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

// Ensure we're `no_std` when compiling for WebAssembly.
#![cfg_attr(not(feature = "std"), no_std)]

//! Types shared between the crowdloan rewards pallet and its claim client.
//!
//! Everything here mirrors what the chain stores or accepts on the wire, so
//! all types are SCALE encodable and carry type information.

pub mod account;
pub mod errors;
pub mod proof;
pub mod reward;

pub use account::*;
pub use errors::*;
pub use proof::*;
pub use reward::*;

/// Native token amount on the target chain.
pub type Balance = u128;

/// Milliseconds, as reported by the chain's timestamp pallet.
pub type Moment = u64;
