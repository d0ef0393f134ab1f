// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2 parameters and password hashing helpers.
//!
//! Release builds use `Argon2::default()` (Argon2id, 19 MiB, 2 iterations).
//! Test builds use minimal parameters so the suite stays fast; those MUST
//! NOT be used in production.

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
#[cfg(test)]
use argon2::{Algorithm, Params, Version};

use crate::error::{IdentityError, Result};

#[inline]
pub(crate) fn argon2_instance() -> Argon2<'static> {
	#[cfg(test)]
	{
		match Params::new(1024, 1, 1, None) {
			Ok(params) => Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
			Err(_) => Argon2::default(),
		}
	}

	#[cfg(not(test))]
	{
		Argon2::default()
	}
}

/// Hash a password into a PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| IdentityError::Hashing(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use argon2::password_hash::{PasswordHash, PasswordVerifier};

	#[test]
	fn hash_verifies_and_hides_plaintext() {
		let phc = hash_password("secret123").unwrap();
		assert!(!phc.contains("secret123"));
		assert!(phc.starts_with("$argon2id$"));

		let parsed = PasswordHash::new(&phc).unwrap();
		assert!(argon2_instance()
			.verify_password(b"secret123", &parsed)
			.is_ok());
		assert!(argon2_instance()
			.verify_password(b"wrong-password", &parsed)
			.is_err());
	}
}
