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

use sp_std::vec::Vec;

const HEX_PREFIX: &str = "0x";

/// Turn a value handed over by a wallet into its raw bytes.
///
/// Wallets return signatures and addresses either as raw bytes, as unprefixed
/// hex or as `0x` prefixed hex. Anything that does not decode as hex is taken
/// as raw bytes.
pub fn normalize_bytes(source: &[u8]) -> Vec<u8> {
	let try_bytes = source.strip_prefix(HEX_PREFIX.as_bytes()).unwrap_or(source);

	match hex::decode(try_bytes) {
		Ok(bytes) if !try_bytes.is_empty() => bytes,
		_ => source.to_vec(),
	}
}

/// Decode a wallet value into exactly `S` bytes.
///
/// A source that already has the expected length is used as is, everything
/// else goes through [`normalize_bytes`].
pub fn decode_fixed<const S: usize>(source: &[u8]) -> Option<[u8; S]> {
	let mut out = [0u8; S];

	if source.len() == S {
		out.copy_from_slice(source);
		return Some(out);
	}

	let bytes = normalize_bytes(source);

	if bytes.len() == S {
		out.copy_from_slice(bytes.as_slice());
		Some(out)
	} else {
		None
	}
}

/// `0x` prefixed lowercase hex, the form wallet extensions expect for raw
/// payloads.
#[cfg(feature = "std")]
pub fn to_prefixed_hex(bytes: impl AsRef<[u8]>) -> String {
	format!("{}{}", HEX_PREFIX, hex::encode(bytes))
}

#[cfg(test)]
mod tests {
	use super::*;

	mod decode_fixed {
		const EXPECTED: usize = 20;
		use super::*;

		#[test]
		fn decode_fixed_works() {
			let raw = [1u8; 20];

			decode_fixed::<EXPECTED>(&raw).expect("raw bytes work");

			let str = String::from("d47ed02acbbb66ee8a3fe0275bd98add0aa607c3");

			decode_fixed::<EXPECTED>(str.as_bytes()).expect("un-prefixed hex works");

			let str = String::from("0xd47ed02acbbb66ee8a3fe0275bd98add0aa607c3");

			assert_eq!(
				decode_fixed::<EXPECTED>(str.as_bytes()),
				decode_fixed::<EXPECTED>(&str.as_bytes()[2..]),
			);
		}

		#[test]
		fn wrong_length_is_rejected() {
			assert_eq!(decode_fixed::<EXPECTED>(&[1u8; 21]), None);
			assert_eq!(decode_fixed::<EXPECTED>(b"0xd47ed02a"), None);
		}
	}

	mod normalize_bytes {
		use super::*;

		#[test]
		fn non_hex_is_kept_raw() {
			let raw = vec![0xffu8, 0x00, 0x13];

			assert_eq!(normalize_bytes(&raw), raw);
			assert_eq!(normalize_bytes(b"0x"), b"0x".to_vec());
		}

		#[test]
		fn hex_is_decoded() {
			assert_eq!(normalize_bytes(b"0x0102"), vec![1u8, 2]);
			assert_eq!(normalize_bytes(b"0a0b"), vec![10u8, 11]);
		}
	}

	#[test]
	fn prefixed_hex() {
		assert_eq!(to_prefixed_hex([0xde, 0xad]), "0xdead");
		assert_eq!(to_prefixed_hex(b"picasso-"), "0x7069636173736f2d");
	}
}
