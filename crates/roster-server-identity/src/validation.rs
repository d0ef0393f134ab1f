// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Input checks shared by every adapter.

use lettre::Address;

use crate::error::{IdentityError, Result};

/// Shortest password accepted for a new account.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate an email and return its canonical (trimmed, lowercased) form.
///
/// Only bare addresses are accepted; `Name <addr>` forms are rejected.
pub fn normalize_email(email: &str) -> Result<String> {
	let trimmed = email.trim();
	trimmed
		.parse::<Address>()
		.map_err(|_| IdentityError::InvalidEmail(trimmed.to_string()))?;
	Ok(trimmed.to_lowercase())
}

pub fn check_password(password: &str) -> Result<()> {
	if password.chars().count() < MIN_PASSWORD_LEN {
		return Err(IdentityError::WeakPassword {
			min: MIN_PASSWORD_LEN,
		});
	}
	Ok(())
}
