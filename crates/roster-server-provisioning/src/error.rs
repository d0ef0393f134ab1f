// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use roster_server_identity::IdentityError;
use roster_server_store::StoreError;

/// Errors that can occur during user provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	#[error("Not signed in")]
	Unauthenticated,

	#[error("Email already in use")]
	AlreadyExists,

	#[error("account creation failed: {0}")]
	CreationFailed(#[source] IdentityError),

	#[error("invalid request: {0}")]
	InvalidRequest(String),

	/// A document write failed after the account was created. The account
	/// is not rolled back.
	#[error("document store error: {0}")]
	Store(#[from] StoreError),
}
