// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite-backed identity service.
//!
//! Accounts live in `identity_accounts` with an Argon2 password hash;
//! bearer tokens live in `identity_tokens` keyed by their SHA-256 hash.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_common_config::SecretString;
use sqlx::sqlite::SqlitePool;

use crate::argon2_config::hash_password;
use crate::error::{IdentityError, Result};
use crate::token::{generate_token, hash_token, is_well_formed};
use crate::types::{CallerIdentity, NewAccount, UserAccount, UserId};
use crate::validation::{check_password, normalize_email};
use crate::IdentityService;

const MIGRATIONS: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS identity_accounts (
		id TEXT PRIMARY KEY,
		email TEXT NOT NULL UNIQUE,
		password_hash TEXT NOT NULL,
		created_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS identity_tokens (
		token_hash TEXT PRIMARY KEY,
		user_id TEXT NOT NULL REFERENCES identity_accounts(id),
		created_at TEXT NOT NULL
	)
	"#,
];

type AccountRow = (String, String, DateTime<Utc>);

fn account_from_row((id, email, created_at): AccountRow) -> UserAccount {
	UserAccount {
		id: UserId::new(id),
		email,
		created_at,
	}
}

/// Repository-style identity adapter over a shared [`SqlitePool`].
#[derive(Clone)]
pub struct SqliteIdentityService {
	pool: SqlitePool,
}

impl SqliteIdentityService {
	/// Create a new service with the given pool.
	///
	/// Call [`SqliteIdentityService::migrate`] once before use.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create the identity tables if they do not exist.
	#[tracing::instrument(skip(self))]
	pub async fn migrate(&self) -> Result<()> {
		for statement in MIGRATIONS {
			sqlx::query(statement).execute(&self.pool).await?;
		}
		tracing::debug!("identity migrations applied");
		Ok(())
	}
}

#[async_trait]
impl IdentityService for SqliteIdentityService {
	#[tracing::instrument(skip(self, account))]
	async fn create_user(&self, account: NewAccount) -> Result<UserAccount> {
		let email = normalize_email(&account.email)?;
		check_password(account.password.expose())?;

		// Argon2 is CPU-bound; keep it off the async workers.
		let password = account.password;
		let password_hash = tokio::task::spawn_blocking(move || hash_password(password.expose()))
			.await
			.map_err(|e| IdentityError::Hashing(e.to_string()))??;

		let created = UserAccount {
			id: UserId::generate(),
			email,
			created_at: Utc::now(),
		};

		let result = sqlx::query(
			"INSERT INTO identity_accounts (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
		)
		.bind(created.id.as_str())
		.bind(&created.email)
		.bind(&password_hash)
		.bind(created.created_at)
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => {
				tracing::debug!(uid = %created.id, "account created");
				Ok(created)
			}
			Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
				Err(IdentityError::EmailExists(created.email))
			}
			Err(e) => Err(e.into()),
		}
	}

	async fn get_user(&self, id: &UserId) -> Result<Option<UserAccount>> {
		let row: Option<AccountRow> =
			sqlx::query_as("SELECT id, email, created_at FROM identity_accounts WHERE id = ?")
				.bind(id.as_str())
				.fetch_optional(&self.pool)
				.await?;
		Ok(row.map(account_from_row))
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
		let row: Option<AccountRow> =
			sqlx::query_as("SELECT id, email, created_at FROM identity_accounts WHERE email = ?")
				.bind(email.trim().to_lowercase())
				.fetch_optional(&self.pool)
				.await?;
		Ok(row.map(account_from_row))
	}

	#[tracing::instrument(skip(self))]
	async fn issue_token(&self, id: &UserId) -> Result<SecretString> {
		if self.get_user(id).await?.is_none() {
			return Err(IdentityError::UserNotFound(id.clone()));
		}

		let token = generate_token();
		sqlx::query("INSERT INTO identity_tokens (token_hash, user_id, created_at) VALUES (?, ?, ?)")
			.bind(hash_token(token.expose()))
			.bind(id.as_str())
			.bind(Utc::now())
			.execute(&self.pool)
			.await?;

		tracing::info!(uid = %id, "caller token issued");
		Ok(token)
	}

	async fn verify_token(&self, token: &str) -> Result<Option<CallerIdentity>> {
		if !is_well_formed(token) {
			return Ok(None);
		}

		let row: Option<(String, String)> = sqlx::query_as(
			"SELECT a.id, a.email FROM identity_tokens t \
			 JOIN identity_accounts a ON a.id = t.user_id \
			 WHERE t.token_hash = ?",
		)
		.bind(hash_token(token))
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|(uid, email)| CallerIdentity {
			uid: UserId::new(uid),
			email,
		}))
	}
}
