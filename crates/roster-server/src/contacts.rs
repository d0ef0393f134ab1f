// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Contact messages and their notification status, for the `contacts`
//! command.

use std::fmt;

use roster_server_notify::STATUS_PENDING;
use roster_server_store::{CollectionPath, DocumentSnapshot, DocumentStore};

use crate::error::ServerError;

/// One contact message as shown to an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSummary {
	pub id: String,
	pub status: String,
	pub name: String,
	pub email: String,
	pub created_at: Option<String>,
	pub error: Option<String>,
}

impl ContactSummary {
	fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
		let field = |name: &str| snapshot.get_str(name).map(str::to_string);
		Self {
			id: snapshot.path.id().to_string(),
			// Records the notifier has not reached yet may carry no status.
			status: field("status").unwrap_or_else(|| STATUS_PENDING.to_string()),
			name: field("name").unwrap_or_default(),
			email: field("email").unwrap_or_default(),
			created_at: field("createdAt"),
			error: field("error"),
		}
	}
}

impl fmt::Display for ContactSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}\t{}\t{}\t{} <{}>",
			self.id,
			self.status,
			self.created_at.as_deref().unwrap_or("-"),
			self.name,
			self.email
		)?;
		if let Some(error) = &self.error {
			write!(f, "\t{error}")?;
		}
		Ok(())
	}
}

/// Contact messages in `collection`, optionally only those with `status`.
pub async fn list_contacts(
	store: &dyn DocumentStore,
	collection: &CollectionPath,
	status: Option<&str>,
) -> Result<Vec<ContactSummary>, ServerError> {
	let summaries = store
		.list(collection)
		.await?
		.iter()
		.map(ContactSummary::from_snapshot)
		.filter(|summary| status.map_or(true, |s| summary.status == s))
		.collect();
	Ok(summaries)
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_server_store::{Document, DocumentPath, MemoryDocumentStore};
	use serde_json::json;

	fn doc(value: serde_json::Value) -> Document {
		value.as_object().cloned().unwrap()
	}

	async fn seeded() -> MemoryDocumentStore {
		let store = MemoryDocumentStore::new();
		for (id, data) in [
			(
				"m1",
				json!({"name": "Jo", "email": "jo@x.com", "status": "sent", "createdAt": "2025-03-01T12:00:00Z"}),
			),
			(
				"m2",
				json!({"name": "Al", "email": "al@y.com", "status": "failed", "error": "send failed: relay refused"}),
			),
			("m3", json!({"name": "Bo", "email": "bo@z.com"})),
		] {
			store
				.set(
					&DocumentPath::parse(&format!("contactMessages/{id}")).unwrap(),
					doc(data),
				)
				.await
				.unwrap();
		}
		store
			.set(
				&DocumentPath::parse("userCompany/u1").unwrap(),
				doc(json!({"email": "a@b.com"})),
			)
			.await
			.unwrap();
		store
	}

	#[tokio::test]
	async fn test_lists_every_contact_in_collection() {
		let store = seeded().await;
		let collection = CollectionPath::root("contactMessages").unwrap();

		let contacts = list_contacts(&store, &collection, None).await.unwrap();

		let ids: Vec<&str> = contacts.iter().map(|c| c.id.as_str()).collect();
		assert_eq!(ids, vec!["m1", "m2", "m3"]);
		assert_eq!(contacts[2].status, "pending");
	}

	#[tokio::test]
	async fn test_filters_by_status() {
		let store = seeded().await;
		let collection = CollectionPath::root("contactMessages").unwrap();

		let failed = list_contacts(&store, &collection, Some("failed"))
			.await
			.unwrap();

		assert_eq!(failed.len(), 1);
		assert_eq!(failed[0].id, "m2");
		assert_eq!(
			failed[0].to_string(),
			"m2\tfailed\t-\tAl <al@y.com>\tsend failed: relay refused"
		);
	}

	#[test]
	fn test_display_without_error() {
		let summary = ContactSummary {
			id: "m1".to_string(),
			status: "sent".to_string(),
			name: "Jo".to_string(),
			email: "jo@x.com".to_string(),
			created_at: Some("2025-03-01T12:00:00Z".to_string()),
			error: None,
		};
		assert_eq!(
			summary.to_string(),
			"m1\tsent\t2025-03-01T12:00:00Z\tJo <jo@x.com>"
		);
	}
}
