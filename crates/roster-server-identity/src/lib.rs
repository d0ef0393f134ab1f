// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity service for Roster.
//!
//! The identity service is the system of record for login credentials and
//! account identifiers. Handlers only see the [`IdentityService`] trait:
//!
//! - [`SqliteIdentityService`] - persistent adapter used by the server
//! - [`MemoryIdentityService`] - in-process adapter for tests and local runs
//!
//! Caller identity for inbound calls is resolved from opaque bearer tokens
//! issued by the same service (see [`token`]).

mod argon2_config;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod token;
pub mod types;
pub mod validation;

pub use error::{IdentityError, Result};
pub use memory::MemoryIdentityService;
pub use sqlite::SqliteIdentityService;
pub use types::{CallerIdentity, NewAccount, UserAccount, UserId};

use async_trait::async_trait;
use roster_common_config::SecretString;

/// Account creation, lookup and caller-token verification.
#[async_trait]
pub trait IdentityService: Send + Sync {
	/// Create an account. The service assigns the id.
	///
	/// Fails with [`IdentityError::EmailExists`] if the email is already
	/// registered (case-insensitive), or with a validation error if the email
	/// or password is rejected. Nothing is created on failure.
	async fn create_user(&self, account: NewAccount) -> Result<UserAccount>;

	async fn get_user(&self, id: &UserId) -> Result<Option<UserAccount>>;

	async fn get_user_by_email(&self, email: &str) -> Result<Option<UserAccount>>;

	/// Issue a new bearer token for an existing account.
	async fn issue_token(&self, id: &UserId) -> Result<SecretString>;

	/// Resolve a bearer token to the caller it was issued for.
	///
	/// Unknown or malformed tokens resolve to `None`.
	async fn verify_token(&self, token: &str) -> Result<Option<CallerIdentity>>;
}
