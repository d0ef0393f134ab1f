// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process identity service.
//!
//! Keeps accounts and token hashes in memory. Passwords are validated and
//! then dropped; nothing about them is retained.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use roster_common_config::SecretString;

use crate::error::{IdentityError, Result};
use crate::token::{generate_token, hash_token, is_well_formed};
use crate::types::{CallerIdentity, NewAccount, UserAccount, UserId};
use crate::validation::{check_password, normalize_email};
use crate::IdentityService;

#[derive(Default)]
struct State {
	accounts: HashMap<UserId, UserAccount>,
	by_email: HashMap<String, UserId>,
	tokens: HashMap<String, UserId>,
	fail_next_create: Option<String>,
}

/// [`IdentityService`] backed by a `Mutex<HashMap>`.
#[derive(Default)]
pub struct MemoryIdentityService {
	state: Mutex<State>,
}

impl MemoryIdentityService {
	pub fn new() -> Self {
		Self::default()
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	/// Make the next `create_user` call fail as if the service were down.
	pub fn fail_next_create(&self, message: impl Into<String>) {
		self.state().fail_next_create = Some(message.into());
	}

	pub fn account_count(&self) -> usize {
		self.state().accounts.len()
	}
}

#[async_trait]
impl IdentityService for MemoryIdentityService {
	#[tracing::instrument(skip(self, account))]
	async fn create_user(&self, account: NewAccount) -> Result<UserAccount> {
		let mut state = self.state();
		if let Some(message) = state.fail_next_create.take() {
			return Err(IdentityError::Unavailable(message));
		}

		let email = normalize_email(&account.email)?;
		check_password(account.password.expose())?;

		if state.by_email.contains_key(&email) {
			return Err(IdentityError::EmailExists(email));
		}

		let created = UserAccount {
			id: UserId::generate(),
			email: email.clone(),
			created_at: Utc::now(),
		};
		state.by_email.insert(email, created.id.clone());
		state.accounts.insert(created.id.clone(), created.clone());

		tracing::debug!(uid = %created.id, "account created");
		Ok(created)
	}

	async fn get_user(&self, id: &UserId) -> Result<Option<UserAccount>> {
		Ok(self.state().accounts.get(id).cloned())
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
		let email = email.trim().to_lowercase();
		let state = self.state();
		Ok(state
			.by_email
			.get(&email)
			.and_then(|id| state.accounts.get(id))
			.cloned())
	}

	async fn issue_token(&self, id: &UserId) -> Result<SecretString> {
		let mut state = self.state();
		if !state.accounts.contains_key(id) {
			return Err(IdentityError::UserNotFound(id.clone()));
		}
		let token = generate_token();
		state.tokens.insert(hash_token(token.expose()), id.clone());
		Ok(token)
	}

	async fn verify_token(&self, token: &str) -> Result<Option<CallerIdentity>> {
		if !is_well_formed(token) {
			return Ok(None);
		}
		let state = self.state();
		Ok(state
			.tokens
			.get(&hash_token(token))
			.and_then(|id| state.accounts.get(id))
			.map(|account| CallerIdentity {
				uid: account.id.clone(),
				email: account.email.clone(),
			}))
	}
}
