// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("Invalid path: {0}")]
	InvalidPath(String),

	#[error("Document not found: {0}")]
	NotFound(String),

	#[error("Document already exists: {0}")]
	AlreadyExists(String),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Store unavailable: {0}")]
	Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
