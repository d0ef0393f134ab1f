// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use roster_server_smtp::SmtpError;
use roster_server_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
	#[error("contact message is missing required field `{0}`")]
	MissingField(&'static str),

	#[error(transparent)]
	Delivery(#[from] SmtpError),

	#[error("failed to record delivery status: {0}")]
	Store(#[from] StoreError),

	/// Delivery failed and the `failed` status could not be written either.
	#[error("{delivery}; failed to record the failure: {store}")]
	Unrecorded {
		delivery: Box<NotifyError>,
		#[source]
		store: StoreError,
	},
}

pub type Result<T> = std::result::Result<T, NotifyError>;
