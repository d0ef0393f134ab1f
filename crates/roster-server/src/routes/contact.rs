// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Contact form intake.
//!
//! Stores each submission as a new `pending` record in the contact
//! collection. Creating the record is what fires the notification trigger.

use axum::{
	extract::{rejection::JsonRejection, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use roster_server_notify::STATUS_PENDING;
use roster_server_store::{server_timestamp, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
	api::AppState,
	api_response::{bad_request, internal_error},
	impl_api_error_response,
};

#[derive(Debug, Deserialize)]
pub struct ContactSubmission {
	pub name: String,
	pub email: String,
	pub company: String,
	pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactSubmitted {
	pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ContactErrorResponse {
	pub error: String,
	pub message: String,
}

impl_api_error_response!(ContactErrorResponse);

impl ContactSubmission {
	fn into_document(self) -> Document {
		let mut doc = Document::new();
		doc.insert("name".to_string(), Value::String(self.name));
		doc.insert("email".to_string(), Value::String(self.email));
		doc.insert("company".to_string(), Value::String(self.company));
		doc.insert("message".to_string(), Value::String(self.message));
		doc.insert("status".to_string(), Value::String(STATUS_PENDING.to_string()));
		doc.insert("createdAt".to_string(), server_timestamp());
		doc
	}
}

/// POST /contactMessages
#[instrument(skip_all)]
pub async fn submit_contact_message(
	State(state): State<AppState>,
	payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response {
	let Json(submission) = match payload {
		Ok(payload) => payload,
		Err(rejection) => {
			return bad_request::<ContactErrorResponse>("invalid_request", rejection.body_text())
				.into_response();
		}
	};

	let id = Uuid::new_v4().simple().to_string();
	let path = match state.contact_collection.doc(&id) {
		Ok(path) => path,
		Err(e) => {
			error!(error = %e, "failed to build contact message path");
			return internal_error::<ContactErrorResponse>("Failed to store message").into_response();
		}
	};

	if let Err(e) = state.store.create(&path, submission.into_document()).await {
		error!(path = %path, error = %e, "failed to store contact message");
		return internal_error::<ContactErrorResponse>("Failed to store message").into_response();
	}

	info!(path = %path, "contact message stored");
	(StatusCode::CREATED, Json(ContactSubmitted { id })).into_response()
}
