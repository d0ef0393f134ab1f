// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Contact form notifications.
//!
//! [`ContactNotifier`] is a [`DocumentTrigger`] for the `contactMessages`
//! collection. For every new record it emails the operator and then marks
//! the record:
//!
//! - `{status: "sent", sentAt}` on delivery
//! - `{status: "failed", error, failedAt}` otherwise, after which the error
//!   is returned to the dispatcher
//!
//! A failed record is not retried.

pub mod error;
pub mod template;

pub use error::{NotifyError, Result};
pub use template::ContactMessage;

use std::sync::Arc;

use async_trait::async_trait;
use roster_server_smtp::{Mailer, OutboundEmail};
use roster_server_store::{DocumentRef, DocumentSnapshot, DocumentTrigger, FieldUpdate, TriggerError};
use tracing::{error, info, instrument, warn};

/// Collection the notifier is registered against.
pub const CONTACT_MESSAGES_COLLECTION: &str = "contactMessages";

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

/// Emails the operator about new contact form submissions.
pub struct ContactNotifier {
	mailer: Arc<dyn Mailer>,
	from: String,
	recipient: String,
}

impl ContactNotifier {
	/// `from` may be a bare address or `Name <address>`.
	pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>, recipient: impl Into<String>) -> Self {
		Self {
			mailer,
			from: from.into(),
			recipient: recipient.into(),
		}
	}

	/// Build the operator email for a contact record.
	pub fn compose(&self, snapshot: &DocumentSnapshot) -> Result<OutboundEmail> {
		let message = ContactMessage::from_snapshot(snapshot)?;
		Ok(OutboundEmail {
			from: self.from.clone(),
			to: self.recipient.clone(),
			reply_to: Some(message.email.clone()),
			subject: message.subject(),
			html: message.html_body(),
			text: message.text_body(),
		})
	}

	async fn deliver(&self, snapshot: &DocumentSnapshot) -> Result<()> {
		let email = self.compose(snapshot)?;
		self.mailer.send(&email).await?;
		Ok(())
	}

	/// Deliver the notification and record the outcome on the document.
	///
	/// The current record is read first; a record already marked `sent` or
	/// `failed` is left alone. Returns the delivery error after the record
	/// has been marked failed.
	#[instrument(skip(self, snapshot, document), fields(path = %document.path()))]
	pub async fn notify(&self, snapshot: DocumentSnapshot, document: DocumentRef) -> Result<()> {
		let Some(current) = document.get().await? else {
			warn!("contact message no longer exists; skipping");
			return Ok(());
		};
		if let Some(status) = current
			.get("status")
			.and_then(|s| s.as_str())
			.filter(|s| *s == STATUS_SENT || *s == STATUS_FAILED)
		{
			warn!(status, "contact message already processed; skipping");
			return Ok(());
		}

		match self.deliver(&snapshot).await {
			Ok(()) => {
				document
					.update(vec![
						("status".to_string(), FieldUpdate::set(STATUS_SENT)),
						("sentAt".to_string(), FieldUpdate::ServerTimestamp),
					])
					.await?;
				info!("contact notification sent");
				Ok(())
			}
			Err(e) => {
				warn!(error = %e, "contact notification failed");
				let recorded = document
					.update(vec![
						("status".to_string(), FieldUpdate::set(STATUS_FAILED)),
						("error".to_string(), FieldUpdate::set(e.to_string())),
						("failedAt".to_string(), FieldUpdate::ServerTimestamp),
					])
					.await;
				match recorded {
					Ok(_) => Err(e),
					Err(store) => {
						error!(delivery_error = %e, store_error = %store, "contact notification failed and could not be recorded");
						Err(NotifyError::Unrecorded {
							delivery: Box::new(e),
							store,
						})
					}
				}
			}
		}
	}
}

#[async_trait]
impl DocumentTrigger for ContactNotifier {
	fn name(&self) -> &'static str {
		"contact-notifier"
	}

	async fn on_created(
		&self,
		snapshot: DocumentSnapshot,
		document: DocumentRef,
	) -> std::result::Result<(), TriggerError> {
		self.notify(snapshot, document).await.map_err(Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_server_smtp::RecordingMailer;
	use roster_server_store::{
		channel, CollectionPath, Document, DocumentPath, DocumentStore, MemoryDocumentStore,
		TriggerDispatcher,
	};
	use serde_json::json;

	fn doc(value: serde_json::Value) -> Document {
		value.as_object().cloned().unwrap()
	}

	fn contact() -> Document {
		doc(json!({
			"name": "Jo",
			"email": "jo@x.com",
			"company": "X",
			"message": "hi\nthere",
			"status": "pending",
		}))
	}

	async fn seeded(data: Document) -> (Arc<MemoryDocumentStore>, DocumentSnapshot, DocumentRef) {
		let store = Arc::new(MemoryDocumentStore::new());
		let path = DocumentPath::parse("contactMessages/m1").unwrap();
		store.create(&path, data.clone()).await.unwrap();
		let snapshot = DocumentSnapshot {
			path: path.clone(),
			data,
		};
		let document = DocumentRef::new(store.clone(), path);
		(store, snapshot, document)
	}

	fn notifier(mailer: Arc<RecordingMailer>) -> ContactNotifier {
		ContactNotifier::new(mailer, "Roster <noreply@roster.test>", "ops@roster.test")
	}

	#[tokio::test]
	async fn sends_email_and_marks_sent() {
		let mailer = Arc::new(RecordingMailer::new());
		let (store, snapshot, document) = seeded(contact()).await;
		let path = document.path().clone();

		notifier(mailer.clone())
			.notify(snapshot, document)
			.await
			.unwrap();

		let sent = mailer.sent();
		assert_eq!(sent.len(), 1);
		let email = &sent[0];
		assert_eq!(email.to, "ops@roster.test");
		assert_eq!(email.from, "Roster <noreply@roster.test>");
		assert_eq!(email.reply_to.as_deref(), Some("jo@x.com"));
		assert_eq!(email.subject, "New contact form submission from Jo");
		assert!(email.text.contains("hi\nthere"));
		assert!(email.html.contains("hi<br>there"));

		let stored = store.get(&path).await.unwrap().unwrap();
		assert_eq!(stored["status"], "sent");
		assert!(stored["sentAt"].is_string());
		assert!(stored.get("error").is_none());
	}

	#[tokio::test]
	async fn delivery_failure_marks_failed_and_returns_error() {
		let mailer = Arc::new(RecordingMailer::new());
		mailer.fail_with("relay refused");
		let (store, snapshot, document) = seeded(contact()).await;
		let path = document.path().clone();

		let err = notifier(mailer.clone())
			.notify(snapshot, document)
			.await
			.unwrap_err();
		assert!(matches!(err, NotifyError::Delivery(_)));

		let stored = store.get(&path).await.unwrap().unwrap();
		assert_eq!(stored["status"], "failed");
		assert_eq!(stored["error"], err.to_string());
		assert!(stored["failedAt"].is_string());
		assert!(stored.get("sentAt").is_none());
	}

	#[tokio::test]
	async fn missing_field_is_marked_failed_without_sending() {
		let mailer = Arc::new(RecordingMailer::new());
		let mut data = contact();
		data.remove("company");
		let (store, snapshot, document) = seeded(data).await;
		let path = document.path().clone();

		let err = notifier(mailer.clone())
			.notify(snapshot, document)
			.await
			.unwrap_err();
		assert!(matches!(err, NotifyError::MissingField("company")));
		assert!(mailer.sent().is_empty());

		let stored = store.get(&path).await.unwrap().unwrap();
		assert_eq!(stored["status"], "failed");
		assert_eq!(
			stored["error"],
			"contact message is missing required field `company`"
		);
	}

	#[tokio::test]
	async fn already_processed_record_is_skipped() {
		let mailer = Arc::new(RecordingMailer::new());
		let mut data = contact();
		data.insert("status".to_string(), json!("sent"));
		let (store, snapshot, document) = seeded(data.clone()).await;
		let path = document.path().clone();

		notifier(mailer.clone())
			.notify(snapshot, document)
			.await
			.unwrap();

		assert!(mailer.sent().is_empty());
		assert_eq!(store.get(&path).await.unwrap().unwrap(), data);
	}

	#[tokio::test]
	async fn replay_with_stale_snapshot_is_skipped() {
		let mailer = Arc::new(RecordingMailer::new());
		let (store, snapshot, document) = seeded(contact()).await;
		let path = document.path().clone();
		store
			.update(&path, vec![("status".to_string(), FieldUpdate::set("sent"))])
			.await
			.unwrap();

		notifier(mailer.clone())
			.notify(snapshot, document)
			.await
			.unwrap();

		assert!(mailer.sent().is_empty());
	}

	#[tokio::test]
	async fn unrecorded_failure_keeps_delivery_error() {
		let mailer = Arc::new(RecordingMailer::new());
		mailer.fail_with("relay refused");
		let (store, snapshot, document) = seeded(contact()).await;
		store.fail_writes_under("contactMessages/", "read-only");

		let err = notifier(mailer.clone())
			.notify(snapshot, document)
			.await
			.unwrap_err();

		match &err {
			NotifyError::Unrecorded { delivery, .. } => {
				assert!(matches!(**delivery, NotifyError::Delivery(_)))
			}
			other => panic!("expected Unrecorded, got {other:?}"),
		}
		let message = err.to_string();
		assert!(message.contains("relay refused"));
		assert!(message.contains("read-only"));
	}

	#[tokio::test]
	async fn status_write_failure_is_reported() {
		let mailer = Arc::new(RecordingMailer::new());
		let (store, snapshot, document) = seeded(contact()).await;
		store.fail_writes_under("contactMessages/", "read-only");

		let err = notifier(mailer.clone())
			.notify(snapshot, document)
			.await
			.unwrap_err();

		assert!(matches!(err, NotifyError::Store(_)));
		assert_eq!(mailer.sent().len(), 1);
	}

	#[tokio::test]
	async fn runs_as_registered_trigger() {
		let (publisher, events) = channel();
		let store = Arc::new(MemoryDocumentStore::new().with_events(publisher));
		let mailer = Arc::new(RecordingMailer::new());

		let mut dispatcher = TriggerDispatcher::new(events, store.clone());
		dispatcher.register(
			CollectionPath::root(CONTACT_MESSAGES_COLLECTION).unwrap(),
			Arc::new(notifier(mailer.clone())),
		);
		let handle = dispatcher.spawn();

		let path = DocumentPath::parse("contactMessages/m1").unwrap();
		store.create(&path, contact()).await.unwrap();
		handle.shutdown().await;

		assert_eq!(mailer.sent().len(), 1);
		let stored = store.get(&path).await.unwrap().unwrap();
		assert_eq!(stored["status"], "sent");
	}
}
