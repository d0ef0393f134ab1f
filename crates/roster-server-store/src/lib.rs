// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document store for Roster.
//!
//! A schemaless, per-path record store with creation triggers:
//!
//! - [`DocumentPath`] / [`CollectionPath`] - validated record addresses
//! - [`DocumentStore`] - create/set/get/update/list over JSON objects
//! - [`FieldUpdate::ServerTimestamp`] - times assigned by the store, not the caller
//! - [`TriggerDispatcher`] - runs [`DocumentTrigger`]s for newly created records
//!
//! Two adapters are provided: [`SqliteDocumentStore`] for the server and
//! [`MemoryDocumentStore`] for tests and local runs.

pub mod document;
pub mod error;
pub mod memory;
pub mod path;
pub mod pool;
pub mod sqlite;
pub mod trigger;

pub use document::{
	format_timestamp, server_timestamp, Document, DocumentRef, DocumentSnapshot, FieldUpdate,
	FieldUpdates,
};
pub use error::{Result, StoreError};
pub use memory::MemoryDocumentStore;
pub use path::{CollectionPath, DocumentPath};
pub use pool::{create_pool, PoolSettings};
pub use sqlite::SqliteDocumentStore;
pub use trigger::{
	channel, DispatcherHandle, DocumentCreated, DocumentTrigger, EventPublisher, EventReceiver,
	TriggerDispatcher, TriggerError,
};

use async_trait::async_trait;

/// Record storage keyed by [`DocumentPath`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Write a new document. Fails with [`StoreError::AlreadyExists`] if one
	/// is present. Fires creation triggers on success.
	async fn create(&self, path: &DocumentPath, data: Document) -> Result<()>;

	/// Write a document, replacing any existing contents (no merge).
	/// Does not fire creation triggers.
	async fn set(&self, path: &DocumentPath, data: Document) -> Result<()>;

	async fn get(&self, path: &DocumentPath) -> Result<Option<Document>>;

	/// Apply field updates to an existing document and return its new
	/// contents. Fails with [`StoreError::NotFound`] if it does not exist.
	async fn update(&self, path: &DocumentPath, updates: FieldUpdates) -> Result<Document>;

	/// Documents directly inside `collection`, ordered by path.
	async fn list(&self, collection: &CollectionPath) -> Result<Vec<DocumentSnapshot>>;
}
