// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Contact notification configuration.

use serde::Deserialize;

const DEFAULT_COLLECTION: &str = "contactMessages";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
	/// Operator address that receives contact notifications.
	pub recipient: Option<String>,
	/// Collection whose new documents trigger a notification.
	pub collection: String,
}

impl Default for NotifyConfig {
	fn default() -> Self {
		Self {
			recipient: None,
			collection: DEFAULT_COLLECTION.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NotifyConfigLayer {
	#[serde(default)]
	pub recipient: Option<String>,
	#[serde(default)]
	pub collection: Option<String>,
}

impl NotifyConfigLayer {
	pub fn merge(&mut self, other: NotifyConfigLayer) {
		if other.recipient.is_some() {
			self.recipient = other.recipient;
		}
		if other.collection.is_some() {
			self.collection = other.collection;
		}
	}

	pub fn finalize(self) -> NotifyConfig {
		NotifyConfig {
			recipient: self.recipient,
			collection: self
				.collection
				.unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
		}
	}
}
