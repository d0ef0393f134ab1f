// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record contents and field updates.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::path::DocumentPath;
use crate::DocumentStore;

/// Schemaless record body: a JSON object.
pub type Document = Map<String, Value>;

/// One field change applied by [`DocumentStore::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
	/// Replace the field with this value.
	Set(Value),
	/// Replace the field with the store's current time.
	ServerTimestamp,
}

impl FieldUpdate {
	pub fn set(value: impl Into<Value>) -> Self {
		FieldUpdate::Set(value.into())
	}
}

/// Ordered list of field changes; later entries win.
pub type FieldUpdates = Vec<(String, FieldUpdate)>;

/// Render a timestamp the way stores persist server-assigned times.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time as a store timestamp value.
pub fn server_timestamp() -> Value {
	Value::String(format_timestamp(Utc::now()))
}

/// Apply `updates` to `document`, resolving server timestamps to `now`.
///
/// Every `ServerTimestamp` in one call resolves to the same instant.
pub(crate) fn apply_updates(document: &mut Document, updates: FieldUpdates, now: DateTime<Utc>) {
	let stamp = format_timestamp(now);
	for (field, update) in updates {
		let value = match update {
			FieldUpdate::Set(value) => value,
			FieldUpdate::ServerTimestamp => Value::String(stamp.clone()),
		};
		document.insert(field, value);
	}
}

/// A record as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
	pub path: DocumentPath,
	pub data: Document,
}

impl DocumentSnapshot {
	/// String field accessor; `None` when missing or not a string.
	pub fn get_str(&self, field: &str) -> Option<&str> {
		self.data.get(field).and_then(Value::as_str)
	}
}

/// Handle to one document, bound to the store that holds it.
///
/// Triggers receive one of these to mutate the record that fired them.
#[derive(Clone)]
pub struct DocumentRef {
	store: Arc<dyn DocumentStore>,
	path: DocumentPath,
}

impl DocumentRef {
	pub fn new(store: Arc<dyn DocumentStore>, path: DocumentPath) -> Self {
		Self { store, path }
	}

	pub fn path(&self) -> &DocumentPath {
		&self.path
	}

	pub async fn get(&self) -> Result<Option<Document>> {
		self.store.get(&self.path).await
	}

	pub async fn update(&self, updates: FieldUpdates) -> Result<Document> {
		self.store.update(&self.path, updates).await
	}
}

impl std::fmt::Debug for DocumentRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DocumentRef")
			.field("path", &self.path)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use serde_json::json;

	#[test]
	fn applies_sets_and_timestamps() {
		let mut doc = json!({"status": "pending", "name": "Jo"})
			.as_object()
			.cloned()
			.unwrap();
		let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

		apply_updates(
			&mut doc,
			vec![
				("status".to_string(), FieldUpdate::set("sent")),
				("sentAt".to_string(), FieldUpdate::ServerTimestamp),
			],
			now,
		);

		assert_eq!(doc["status"], "sent");
		assert_eq!(doc["sentAt"], "2025-03-01T12:00:00.000Z");
		assert_eq!(doc["name"], "Jo");
	}

	#[test]
	fn later_updates_win() {
		let mut doc = Document::new();
		apply_updates(
			&mut doc,
			vec![
				("status".to_string(), FieldUpdate::set("a")),
				("status".to_string(), FieldUpdate::set("b")),
			],
			Utc::now(),
		);
		assert_eq!(doc["status"], "b");
	}

	#[test]
	fn snapshot_string_accessor() {
		let snapshot = DocumentSnapshot {
			path: DocumentPath::parse("contactMessages/m1").unwrap(),
			data: json!({"name": "Jo", "age": 3}).as_object().cloned().unwrap(),
		};
		assert_eq!(snapshot.get_str("name"), Some("Jo"));
		assert_eq!(snapshot.get_str("age"), None);
		assert_eq!(snapshot.get_str("missing"), None);
	}
}
