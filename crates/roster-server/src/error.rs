// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Startup and wiring errors.

use roster_server_config::ConfigError;
use roster_server_identity::IdentityError;
use roster_server_smtp::SmtpError;
use roster_server_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("document store error: {0}")]
	Store(#[from] StoreError),

	#[error("identity service error: {0}")]
	Identity(#[from] IdentityError),

	#[error("mail transport error: {0}")]
	Smtp(#[from] SmtpError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
