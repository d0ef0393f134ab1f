// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::types::UserId;

/// Errors reported by an identity service adapter.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
	#[error("email already in use: {0}")]
	EmailExists(String),

	#[error("invalid email address: {0}")]
	InvalidEmail(String),

	#[error("password must be at least {min} characters")]
	WeakPassword { min: usize },

	#[error("user not found: {0}")]
	UserNotFound(UserId),

	#[error("password hashing failed: {0}")]
	Hashing(String),

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("identity service unavailable: {0}")]
	Unavailable(String),
}

impl IdentityError {
	/// True when the service rejected the caller's input rather than failing
	/// internally.
	pub fn is_rejected_input(&self) -> bool {
		matches!(
			self,
			IdentityError::InvalidEmail(_) | IdentityError::WeakPassword { .. }
		)
	}
}

pub type Result<T> = std::result::Result<T, IdentityError>;
