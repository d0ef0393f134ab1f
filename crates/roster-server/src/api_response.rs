// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! API response helpers.
//!
//! Two response shapes are used:
//! - callable endpoints answer `{"result": ...}` or
//!   `{"error": {"status": "...", "message": "..."}}`
//! - plain REST endpoints answer with their own body or
//!   `{"error": "...", "message": "..."}` via [`ApiErrorResponse`]

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use roster_server_provisioning::ProvisioningError;
use serde::Serialize;
use serde_json::json;

/// Canonical error status of a callable endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableStatus {
	Unauthenticated,
	AlreadyExists,
	InvalidArgument,
	Internal,
}

impl CallableStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			CallableStatus::Unauthenticated => "UNAUTHENTICATED",
			CallableStatus::AlreadyExists => "ALREADY_EXISTS",
			CallableStatus::InvalidArgument => "INVALID_ARGUMENT",
			CallableStatus::Internal => "INTERNAL",
		}
	}

	pub fn http_status(&self) -> StatusCode {
		match self {
			CallableStatus::Unauthenticated => StatusCode::UNAUTHORIZED,
			CallableStatus::AlreadyExists => StatusCode::CONFLICT,
			CallableStatus::InvalidArgument => StatusCode::BAD_REQUEST,
			CallableStatus::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// An error returned from a callable endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableError {
	pub status: CallableStatus,
	pub message: String,
}

impl CallableError {
	pub fn new(status: CallableStatus, message: impl Into<String>) -> Self {
		Self {
			status,
			message: message.into(),
		}
	}

	pub fn invalid_argument(message: impl Into<String>) -> Self {
		Self::new(CallableStatus::InvalidArgument, message)
	}

	pub fn internal() -> Self {
		Self::new(CallableStatus::Internal, "Internal error")
	}
}

impl IntoResponse for CallableError {
	fn into_response(self) -> Response {
		(
			self.status.http_status(),
			Json(json!({
				"error": {
					"status": self.status.as_str(),
					"message": self.message,
				}
			})),
		)
			.into_response()
	}
}

impl From<ProvisioningError> for CallableError {
	fn from(e: ProvisioningError) -> Self {
		match &e {
			ProvisioningError::Unauthenticated => {
				Self::new(CallableStatus::Unauthenticated, e.to_string())
			}
			ProvisioningError::AlreadyExists => Self::new(CallableStatus::AlreadyExists, e.to_string()),
			ProvisioningError::CreationFailed(inner) if inner.is_rejected_input() => {
				Self::invalid_argument(inner.to_string())
			}
			ProvisioningError::InvalidRequest(message) => Self::invalid_argument(message.clone()),
			ProvisioningError::CreationFailed(_) | ProvisioningError::Store(_) => Self::internal(),
		}
	}
}

/// Wrap a callable endpoint's return value as `{"result": value}`.
pub fn callable_result<T: Serialize>(value: T) -> Response {
	(StatusCode::OK, Json(json!({ "result": value }))).into_response()
}

/// Trait for API error response types that have `error` and `message` fields.
pub trait ApiErrorResponse: Serialize + Send {
	fn new(error: impl Into<String>, message: impl Into<String>) -> Self;
}

/// Implement `ApiErrorResponse` for a struct with `error` and `message` fields.
///
/// # Example
///
/// ```ignore
/// impl_api_error_response!(ContactErrorResponse);
/// ```
#[macro_export]
macro_rules! impl_api_error_response {
	($ty:ty) => {
		impl $crate::api_response::ApiErrorResponse for $ty {
			fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
				Self {
					error: error.into(),
					message: message.into(),
				}
			}
		}
	};
}

/// Create a 400 Bad Request response.
pub fn bad_request<T: ApiErrorResponse>(
	error: impl Into<String>,
	message: impl Into<String>,
) -> (StatusCode, Json<T>) {
	(StatusCode::BAD_REQUEST, Json(T::new(error, message)))
}

/// Create a 500 Internal Server Error response.
pub fn internal_error<T: ApiErrorResponse>(message: impl Into<String>) -> (StatusCode, Json<T>) {
	(
		StatusCode::INTERNAL_SERVER_ERROR,
		Json(T::new("internal_error", message)),
	)
}
