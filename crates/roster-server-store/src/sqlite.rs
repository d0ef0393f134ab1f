// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite-backed document store.
//!
//! Every document is one row in `documents`, with the JSON body stored as
//! text and the parent collection path indexed for listing.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use crate::document::{apply_updates, Document, DocumentSnapshot, FieldUpdates};
use crate::error::{Result, StoreError};
use crate::path::{CollectionPath, DocumentPath};
use crate::trigger::{DocumentCreated, EventPublisher};
use crate::DocumentStore;

const MIGRATIONS: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS documents (
		path TEXT PRIMARY KEY,
		parent TEXT NOT NULL,
		data TEXT NOT NULL,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent)",
];

fn decode(path: &str, data: &str) -> Result<Document> {
	let value: serde_json::Value = serde_json::from_str(data)?;
	match value {
		serde_json::Value::Object(map) => Ok(map),
		_ => Err(StoreError::Unavailable(format!(
			"document {path} is not a JSON object"
		))),
	}
}

/// Document store over a shared [`SqlitePool`].
#[derive(Clone)]
pub struct SqliteDocumentStore {
	pool: SqlitePool,
	events: Option<EventPublisher>,
}

impl SqliteDocumentStore {
	/// Create a new store with the given pool.
	///
	/// Call [`SqliteDocumentStore::migrate`] once before use.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool, events: None }
	}

	/// Publish creation events to a trigger dispatcher.
	pub fn with_events(mut self, events: EventPublisher) -> Self {
		self.events = Some(events);
		self
	}

	/// Create the documents table if it does not exist.
	#[tracing::instrument(skip(self))]
	pub async fn migrate(&self) -> Result<()> {
		for statement in MIGRATIONS {
			sqlx::query(statement).execute(&self.pool).await?;
		}
		tracing::debug!("document store migrations applied");
		Ok(())
	}
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
	#[tracing::instrument(skip(self, data), fields(path = %path))]
	async fn create(&self, path: &DocumentPath, data: Document) -> Result<()> {
		let body = serde_json::to_string(&data)?;
		let now = Utc::now();
		let result = sqlx::query(
			"INSERT INTO documents (path, parent, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
		)
		.bind(path.to_string())
		.bind(path.parent().to_string())
		.bind(&body)
		.bind(now)
		.bind(now)
		.execute(&self.pool)
		.await;

		match result {
			Ok(_) => {}
			Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
				return Err(StoreError::AlreadyExists(path.to_string()));
			}
			Err(e) => return Err(e.into()),
		}

		if let Some(events) = &self.events {
			events.publish(DocumentCreated {
				path: path.clone(),
				data,
			});
		}
		Ok(())
	}

	#[tracing::instrument(skip(self, data), fields(path = %path))]
	async fn set(&self, path: &DocumentPath, data: Document) -> Result<()> {
		let body = serde_json::to_string(&data)?;
		let now = Utc::now();
		sqlx::query(
			"INSERT INTO documents (path, parent, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?) \
			 ON CONFLICT(path) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
		)
		.bind(path.to_string())
		.bind(path.parent().to_string())
		.bind(&body)
		.bind(now)
		.bind(now)
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	async fn get(&self, path: &DocumentPath) -> Result<Option<Document>> {
		let rendered = path.to_string();
		let row: Option<(String,)> = sqlx::query_as("SELECT data FROM documents WHERE path = ?")
			.bind(&rendered)
			.fetch_optional(&self.pool)
			.await?;
		row.map(|(data,)| decode(&rendered, &data)).transpose()
	}

	#[tracing::instrument(skip(self, updates), fields(path = %path))]
	async fn update(&self, path: &DocumentPath, updates: FieldUpdates) -> Result<Document> {
		let rendered = path.to_string();
		let mut tx = self.pool.begin().await?;

		let row: Option<(String,)> = sqlx::query_as("SELECT data FROM documents WHERE path = ?")
			.bind(&rendered)
			.fetch_optional(&mut *tx)
			.await?;
		let (data,) = row.ok_or_else(|| StoreError::NotFound(rendered.clone()))?;

		let now = Utc::now();
		let mut document = decode(&rendered, &data)?;
		apply_updates(&mut document, updates, now);

		sqlx::query("UPDATE documents SET data = ?, updated_at = ? WHERE path = ?")
			.bind(serde_json::to_string(&document)?)
			.bind(now)
			.bind(&rendered)
			.execute(&mut *tx)
			.await?;
		tx.commit().await?;

		Ok(document)
	}

	async fn list(&self, collection: &CollectionPath) -> Result<Vec<DocumentSnapshot>> {
		let rows: Vec<(String, String)> =
			sqlx::query_as("SELECT path, data FROM documents WHERE parent = ? ORDER BY path")
				.bind(collection.to_string())
				.fetch_all(&self.pool)
				.await?;

		rows
			.into_iter()
			.map(|(path, data)| -> Result<DocumentSnapshot> {
				Ok(DocumentSnapshot {
					data: decode(&path, &data)?,
					path: DocumentPath::parse(&path)?,
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::document::FieldUpdate;
	use crate::pool::{create_pool, PoolSettings};
	use crate::trigger::channel;
	use serde_json::json;
	use tempfile::TempDir;

	async fn setup() -> (SqliteDocumentStore, TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("documents.db").display());
		let pool = create_pool(&PoolSettings::new(url)).await.unwrap();
		let store = SqliteDocumentStore::new(pool);
		store.migrate().await.unwrap();
		(store, dir)
	}

	fn doc(value: serde_json::Value) -> Document {
		value.as_object().cloned().unwrap()
	}

	#[tokio::test]
	async fn set_then_get_round_trips_nested_json() {
		let (store, _dir) = setup().await;
		let path = DocumentPath::parse("companies/acme/users/u1").unwrap();
		let data = doc(json!({"role": "admin", "tags": ["a", "b"], "meta": {"n": 1}}));
		store.set(&path, data.clone()).await.unwrap();
		assert_eq!(store.get(&path).await.unwrap(), Some(data));
	}

	#[tokio::test]
	async fn set_overwrites_existing_document() {
		let (store, _dir) = setup().await;
		let path = DocumentPath::parse("userCompany/u1").unwrap();
		store
			.set(&path, doc(json!({"email": "old@b.com", "extra": 1})))
			.await
			.unwrap();
		store
			.set(&path, doc(json!({"email": "a@b.com", "companyId": "acme"})))
			.await
			.unwrap();
		assert_eq!(
			store.get(&path).await.unwrap().unwrap(),
			doc(json!({"email": "a@b.com", "companyId": "acme"}))
		);
	}

	#[tokio::test]
	async fn create_publishes_event_and_rejects_duplicates() {
		let (store, _dir) = setup().await;
		let (publisher, mut events) = channel();
		let store = store.with_events(publisher);
		let path = DocumentPath::parse("contactMessages/m1").unwrap();

		store
			.create(&path, doc(json!({"name": "Jo"})))
			.await
			.unwrap();
		let event = events.rx.recv().await.unwrap();
		assert_eq!(event.path, path);
		assert_eq!(event.data["name"], "Jo");

		let err = store.create(&path, doc(json!({}))).await.unwrap_err();
		assert!(matches!(err, StoreError::AlreadyExists(_)));
	}

	#[tokio::test]
	async fn update_merges_fields_and_stamps_time() {
		let (store, _dir) = setup().await;
		let path = DocumentPath::parse("contactMessages/m1").unwrap();
		store
			.create(&path, doc(json!({"name": "Jo", "status": "pending"})))
			.await
			.unwrap();

		store
			.update(
				&path,
				vec![
					("status".to_string(), FieldUpdate::set("failed")),
					("error".to_string(), FieldUpdate::set("relay refused")),
					("failedAt".to_string(), FieldUpdate::ServerTimestamp),
				],
			)
			.await
			.unwrap();

		let stored = store.get(&path).await.unwrap().unwrap();
		assert_eq!(stored["name"], "Jo");
		assert_eq!(stored["status"], "failed");
		assert_eq!(stored["error"], "relay refused");
		assert!(stored["failedAt"].is_string());
	}

	#[tokio::test]
	async fn update_missing_document_is_not_found() {
		let (store, _dir) = setup().await;
		let path = DocumentPath::parse("contactMessages/nope").unwrap();
		let err = store.update(&path, vec![]).await.unwrap_err();
		assert!(matches!(err, StoreError::NotFound(_)));
	}

	#[tokio::test]
	async fn list_filters_by_parent_collection() {
		let (store, _dir) = setup().await;
		for path in ["companies/acme/users/u1", "companies/acme/users/u2", "userCompany/u1"] {
			store
				.set(&DocumentPath::parse(path).unwrap(), doc(json!({})))
				.await
				.unwrap();
		}
		let listed = store
			.list(&CollectionPath::parse("companies/acme/users").unwrap())
			.await
			.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].path.id(), "u1");
	}
}
