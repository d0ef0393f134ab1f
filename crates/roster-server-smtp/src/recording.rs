// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Mailer, OutboundEmail, SmtpError};

/// In-memory [`Mailer`] that records every message instead of sending it.
///
/// Used by tests and by local runs without an SMTP relay. A failure can be
/// injected with [`RecordingMailer::fail_with`]; while set, every send
/// returns [`SmtpError::Send`] with that message and records nothing.
#[derive(Debug, Default)]
pub struct RecordingMailer {
	sent: Mutex<Vec<OutboundEmail>>,
	failure: Mutex<Option<String>>,
}

impl RecordingMailer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make subsequent sends fail with `message`.
	pub fn fail_with(&self, message: impl Into<String>) {
		*self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
	}

	/// Clear an injected failure.
	pub fn recover(&self) {
		*self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
	}

	/// Messages delivered so far, oldest first.
	pub fn sent(&self) -> Vec<OutboundEmail> {
		self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
	}
}

#[async_trait]
impl Mailer for RecordingMailer {
	async fn send(&self, email: &OutboundEmail) -> Result<(), SmtpError> {
		if let Some(message) = self
			.failure
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
		{
			tracing::debug!(error = %message, "recording mailer failing send");
			return Err(SmtpError::Send(message));
		}

		self
			.sent
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(email.clone());
		Ok(())
	}
}
