// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The SQLite pool shared by the identity service and the document store.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
	SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::error::{Result, StoreError};

/// How to open the database.
#[derive(Debug, Clone)]
pub struct PoolSettings {
	/// SQLite connection string, e.g. `sqlite:./roster.db` or `sqlite::memory:`.
	pub url: String,
	pub max_connections: u32,
	pub busy_timeout: Duration,
}

impl PoolSettings {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			max_connections: 5,
			busy_timeout: Duration::from_secs(5),
		}
	}

	/// Each connection to an in-memory database sees its own database.
	pub fn is_in_memory(&self) -> bool {
		self.url.contains(":memory:") || self.url.contains("mode=memory")
	}

	fn connect_options(&self) -> Result<SqliteConnectOptions> {
		let options = SqliteConnectOptions::from_str(&self.url)
			.map_err(|e| StoreError::Unavailable(format!("Invalid database URL: {e}")))?
			.foreign_keys(true)
			.busy_timeout(self.busy_timeout);

		if self.is_in_memory() {
			return Ok(options);
		}
		Ok(options
			.create_if_missing(true)
			.journal_mode(SqliteJournalMode::Wal)
			.synchronous(SqliteSynchronous::Normal))
	}
}

/// Open a pool for `settings`.
///
/// File databases are created if missing and run in WAL mode. In-memory
/// databases are limited to a single connection so every caller shares them.
#[tracing::instrument(skip(settings), fields(max_connections = settings.max_connections))]
pub async fn create_pool(settings: &PoolSettings) -> Result<SqlitePool> {
	let max_connections = if settings.is_in_memory() {
		1
	} else {
		settings.max_connections
	};

	let pool = SqlitePoolOptions::new()
		.max_connections(max_connections)
		.connect_with(settings.connect_options()?)
		.await?;

	tracing::debug!(in_memory = settings.is_in_memory(), "database pool created");
	Ok(pool)
}
