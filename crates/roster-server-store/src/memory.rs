// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process document store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::document::{apply_updates, Document, DocumentSnapshot, FieldUpdates};
use crate::error::{Result, StoreError};
use crate::path::{CollectionPath, DocumentPath};
use crate::trigger::{DocumentCreated, EventPublisher};
use crate::DocumentStore;

#[derive(Default)]
struct State {
	documents: BTreeMap<DocumentPath, Document>,
	failing_prefixes: Vec<(String, String)>,
	writes: usize,
}

impl State {
	fn check_writable(&self, path: &DocumentPath) -> Result<()> {
		let rendered = path.to_string();
		match self
			.failing_prefixes
			.iter()
			.find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
		{
			Some((_, message)) => Err(StoreError::Unavailable(message.clone())),
			None => Ok(()),
		}
	}
}

/// [`DocumentStore`] held in a `Mutex<BTreeMap>`.
///
/// Writes under a path prefix can be made to fail with
/// [`MemoryDocumentStore::fail_writes_under`].
#[derive(Default)]
pub struct MemoryDocumentStore {
	state: Mutex<State>,
	events: Option<EventPublisher>,
}

impl MemoryDocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Publish creation events to a trigger dispatcher.
	pub fn with_events(mut self, events: EventPublisher) -> Self {
		self.events = Some(events);
		self
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	/// Fail every write whose path starts with `prefix`.
	pub fn fail_writes_under(&self, prefix: impl Into<String>, message: impl Into<String>) {
		self
			.state()
			.failing_prefixes
			.push((prefix.into(), message.into()));
	}

	/// Number of successful writes (create, set, update) so far.
	pub fn write_count(&self) -> usize {
		self.state().writes
	}

	pub fn len(&self) -> usize {
		self.state().documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
	async fn create(&self, path: &DocumentPath, data: Document) -> Result<()> {
		{
			let mut state = self.state();
			state.check_writable(path)?;
			if state.documents.contains_key(path) {
				return Err(StoreError::AlreadyExists(path.to_string()));
			}
			state.documents.insert(path.clone(), data.clone());
			state.writes += 1;
		}

		if let Some(events) = &self.events {
			events.publish(DocumentCreated {
				path: path.clone(),
				data,
			});
		}
		Ok(())
	}

	async fn set(&self, path: &DocumentPath, data: Document) -> Result<()> {
		let mut state = self.state();
		state.check_writable(path)?;
		state.documents.insert(path.clone(), data);
		state.writes += 1;
		Ok(())
	}

	async fn get(&self, path: &DocumentPath) -> Result<Option<Document>> {
		Ok(self.state().documents.get(path).cloned())
	}

	async fn update(&self, path: &DocumentPath, updates: FieldUpdates) -> Result<Document> {
		let mut state = self.state();
		state.check_writable(path)?;
		let document = state
			.documents
			.get_mut(path)
			.ok_or_else(|| StoreError::NotFound(path.to_string()))?;
		apply_updates(document, updates, Utc::now());
		let updated = document.clone();
		state.writes += 1;
		Ok(updated)
	}

	async fn list(&self, collection: &CollectionPath) -> Result<Vec<DocumentSnapshot>> {
		Ok(self
			.state()
			.documents
			.iter()
			.filter(|(path, _)| &path.parent() == collection)
			.map(|(path, data)| DocumentSnapshot {
				path: path.clone(),
				data: data.clone(),
			})
			.collect())
	}
}
