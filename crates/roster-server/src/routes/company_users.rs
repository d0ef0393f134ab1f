// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Callable endpoint for company user provisioning.
//!
//! Request: `{"data": {"email", "password", "companyId", "userData"}}` with an
//! optional `Authorization: Bearer` header.
//! Response: `{"result": {"success": true, "uid": "..."}}` or a callable error.

use axum::{
	body::Bytes,
	extract::State,
	http::HeaderMap,
	response::{IntoResponse, Response},
};
use roster_server_provisioning::{CallContext, CreateCompanyUserRequest, ProvisioningError};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, instrument};

use crate::{
	api::AppState,
	api_response::{callable_result, CallableError},
	auth::resolve_caller,
};

#[derive(Debug, Deserialize)]
struct CallableRequest {
	data: Value,
}

fn parse_envelope(body: &[u8]) -> Result<CallableRequest, CallableError> {
	serde_json::from_slice(body)
		.map_err(|e| CallableError::invalid_argument(format!("Bad request: {e}")))
}

fn parse_data(data: Value) -> Result<CreateCompanyUserRequest, CallableError> {
	serde_json::from_value(data)
		.map_err(|e| CallableError::invalid_argument(format!("Invalid data: {e}")))
}

/// POST /createCompanyUser
#[instrument(skip_all)]
pub async fn create_company_user(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let envelope = match parse_envelope(&body) {
		Ok(envelope) => envelope,
		Err(e) => return e.into_response(),
	};

	let ctx = match resolve_caller(state.identity.as_ref(), &headers).await {
		Ok(Some(caller)) => CallContext::signed_in(caller),
		Ok(None) => {
			return CallableError::from(ProvisioningError::Unauthenticated).into_response();
		}
		Err(e) => {
			error!(error = %e, "failed to verify caller token");
			return CallableError::internal().into_response();
		}
	};

	let request = match parse_data(envelope.data) {
		Ok(request) => request,
		Err(e) => return e.into_response(),
	};

	match state.provisioning.create_company_user(&ctx, request).await {
		Ok(response) => callable_result(response),
		Err(e) => CallableError::from(e).into_response(),
	}
}
