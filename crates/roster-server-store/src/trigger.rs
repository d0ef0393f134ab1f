// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Creation triggers.
//!
//! Stores publish a [`DocumentCreated`] event for every successful
//! [`DocumentStore::create`]. A [`TriggerDispatcher`] task receives those
//! events over a channel and invokes every [`DocumentTrigger`] registered for
//! the document's collection, each invocation in its own task.
//!
//! ```text
//! store.create() ──► EventPublisher ══ mpsc ══► TriggerDispatcher
//!                                                   │
//!                                                   ├─► trigger A (task)
//!                                                   └─► trigger B (task)
//! ```
//!
//! A trigger error is logged and dropped. There is no redelivery.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::document::{Document, DocumentRef, DocumentSnapshot};
use crate::path::{CollectionPath, DocumentPath};
use crate::DocumentStore;

/// Error type returned by triggers.
pub type TriggerError = Box<dyn std::error::Error + Send + Sync>;

/// A document was created.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCreated {
	pub path: DocumentPath,
	pub data: Document,
}

/// Sending half handed to stores.
#[derive(Debug, Clone)]
pub struct EventPublisher {
	tx: mpsc::UnboundedSender<DocumentCreated>,
}

impl EventPublisher {
	pub(crate) fn publish(&self, event: DocumentCreated) {
		if self.tx.send(event).is_err() {
			warn!("trigger dispatcher is gone; creation event dropped");
		}
	}
}

/// Receiving half consumed by the dispatcher.
#[derive(Debug)]
pub struct EventReceiver {
	pub(crate) rx: mpsc::UnboundedReceiver<DocumentCreated>,
}

/// Create a connected publisher/receiver pair.
pub fn channel() -> (EventPublisher, EventReceiver) {
	let (tx, rx) = mpsc::unbounded_channel();
	(EventPublisher { tx }, EventReceiver { rx })
}

/// Callback invoked once per created document in a watched collection.
#[async_trait]
pub trait DocumentTrigger: Send + Sync {
	/// Name used in logs.
	fn name(&self) -> &'static str;

	/// Handle a newly created document.
	///
	/// `document` can be used to mutate the record that fired the trigger.
	async fn on_created(
		&self,
		snapshot: DocumentSnapshot,
		document: DocumentRef,
	) -> Result<(), TriggerError>;
}

struct Registration {
	collection: CollectionPath,
	trigger: Arc<dyn DocumentTrigger>,
}

/// Routes creation events to registered triggers.
pub struct TriggerDispatcher {
	events: EventReceiver,
	store: Arc<dyn DocumentStore>,
	registrations: Vec<Registration>,
}

impl TriggerDispatcher {
	pub fn new(events: EventReceiver, store: Arc<dyn DocumentStore>) -> Self {
		Self {
			events,
			store,
			registrations: Vec::new(),
		}
	}

	/// Invoke `trigger` for documents created directly under `collection`.
	pub fn register(&mut self, collection: CollectionPath, trigger: Arc<dyn DocumentTrigger>) {
		info!(collection = %collection, trigger = trigger.name(), "registered creation trigger");
		self.registrations.push(Registration {
			collection,
			trigger,
		});
	}

	pub fn trigger_count(&self) -> usize {
		self.registrations.len()
	}

	/// Start the dispatch loop on the current runtime.
	pub fn spawn(self) -> DispatcherHandle {
		let (shutdown_tx, shutdown_rx) = oneshot::channel();
		let join = tokio::spawn(self.run(shutdown_rx));
		DispatcherHandle {
			shutdown: shutdown_tx,
			join,
		}
	}

	async fn run(self, mut shutdown: oneshot::Receiver<()>) {
		let TriggerDispatcher {
			events,
			store,
			registrations,
		} = self;
		let mut rx = events.rx;
		let mut in_flight = JoinSet::new();

		loop {
			tokio::select! {
				biased;
				event = rx.recv() => match event {
					Some(event) => dispatch(&registrations, &store, event, &mut in_flight),
					None => break,
				},
				_ = &mut shutdown => {
					rx.close();
					while let Some(event) = rx.recv().await {
						dispatch(&registrations, &store, event, &mut in_flight);
					}
					break;
				}
				Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
					log_join(result);
				}
			}
		}

		while let Some(result) = in_flight.join_next().await {
			log_join(result);
		}
		debug!("trigger dispatcher stopped");
	}
}

fn dispatch(
	registrations: &[Registration],
	store: &Arc<dyn DocumentStore>,
	event: DocumentCreated,
	in_flight: &mut JoinSet<()>,
) {
	let collection = event.path.parent();
	for registration in registrations
		.iter()
		.filter(|r| r.collection == collection)
	{
		let trigger = Arc::clone(&registration.trigger);
		let snapshot = DocumentSnapshot {
			path: event.path.clone(),
			data: event.data.clone(),
		};
		let document = DocumentRef::new(Arc::clone(store), event.path.clone());

		in_flight.spawn(async move {
			let path = snapshot.path.clone();
			match trigger.on_created(snapshot, document).await {
				Ok(()) => debug!(trigger = trigger.name(), path = %path, "trigger completed"),
				Err(e) => error!(
					trigger = trigger.name(),
					path = %path,
					error = %e,
					"trigger failed"
				),
			}
		});
	}
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
	if let Err(e) = result {
		error!(error = %e, "trigger task panicked");
	}
}

/// Handle to a running dispatcher.
pub struct DispatcherHandle {
	shutdown: oneshot::Sender<()>,
	join: JoinHandle<()>,
}

impl DispatcherHandle {
	/// Stop accepting events, run everything already queued, and wait for
	/// in-flight triggers to finish.
	pub async fn shutdown(self) {
		let _ = self.shutdown.send(());
		if let Err(e) = self.join.await {
			error!(error = %e, "trigger dispatcher panicked");
		}
	}
}
