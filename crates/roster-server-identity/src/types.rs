// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account and caller types.

use std::fmt;

use chrono::{DateTime, Utc};
use roster_common_config::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque account identifier assigned by the identity service.
///
/// Document paths embed this value, so it never contains `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
	/// Wrap an existing identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Generate a new random identifier.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().simple().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// An account held by the identity service.
///
/// The password is never part of this struct; it only exists as a write-only
/// input in [`NewAccount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
	pub id: UserId,
	pub email: String,
	pub created_at: DateTime<Utc>,
}

/// Input for account creation.
#[derive(Debug, Clone)]
pub struct NewAccount {
	pub email: String,
	pub password: SecretString,
}

impl NewAccount {
	pub fn new(email: impl Into<String>, password: impl Into<SecretString>) -> Self {
		Self {
			email: email.into(),
			password: password.into(),
		}
	}
}

/// The principal attached to an inbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
	pub uid: UserId,
	pub email: String,
}
