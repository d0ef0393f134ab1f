// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller bearer tokens.
//!
//! Tokens are `rt_` followed by 64 hex characters (32 random bytes). Only
//! the SHA-256 hash of a token is stored; the plaintext is handed out once
//! and never logged.

use rand::RngCore;
use roster_common_config::SecretString;
use sha2::{Digest, Sha256};

/// Prefix identifying Roster caller tokens.
pub const TOKEN_PREFIX: &str = "rt_";

const TOKEN_BYTES: usize = 32;

/// Generate a fresh token.
pub fn generate_token() -> SecretString {
	let mut bytes = [0u8; TOKEN_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);
	SecretString::new(format!("{TOKEN_PREFIX}{}", hex::encode(bytes)))
}

/// Hash a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
	hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap shape check before touching storage.
pub fn is_well_formed(token: &str) -> bool {
	token
		.strip_prefix(TOKEN_PREFIX)
		.is_some_and(|rest| rest.len() == TOKEN_BYTES * 2 && rest.bytes().all(|b| b.is_ascii_hexdigit()))
}
