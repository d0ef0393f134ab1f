// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Caller identity for inbound calls.
//!
//! ```text
//! Authorization: Bearer rt_... → IdentityService::verify_token → CallerIdentity
//! ```
//!
//! A missing, malformed or unknown token is not an error here; the call
//! simply has no caller and the handler decides what that means.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use roster_server_identity::{CallerIdentity, IdentityService, Result};
use tracing::{debug, instrument};

/// Extract bearer token from Authorization header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let auth_header = headers.get(AUTHORIZATION)?;
	let auth_str = auth_header.to_str().ok()?;
	auth_str.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

/// Resolve the caller of a request, if any.
///
/// # Errors
///
/// Only fails if the identity service itself fails.
#[instrument(skip_all)]
pub async fn resolve_caller(
	identity: &dyn IdentityService,
	headers: &HeaderMap,
) -> Result<Option<CallerIdentity>> {
	let Some(token) = extract_bearer_token(headers) else {
		debug!("no bearer token");
		return Ok(None);
	};

	let caller = identity.verify_token(token).await?;
	if caller.is_none() {
		debug!("bearer token not recognized");
	}
	Ok(caller)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;
	use roster_server_identity::{MemoryIdentityService, NewAccount};

	fn headers(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
		headers
	}

	#[test]
	fn test_extract_bearer_token() {
		assert_eq!(extract_bearer_token(&headers("Bearer rt_abc")), Some("rt_abc"));
		assert_eq!(extract_bearer_token(&headers("Basic dXNlcg==")), None);
		assert_eq!(extract_bearer_token(&headers("Bearer ")), None);
		assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
	}

	#[tokio::test]
	async fn test_resolve_caller_with_issued_token() {
		let identity = MemoryIdentityService::new();
		let account = identity
			.create_user(NewAccount::new("admin@acme.com", "secret123"))
			.await
			.unwrap();
		let token = identity.issue_token(&account.id).await.unwrap();

		let caller = resolve_caller(&identity, &headers(&format!("Bearer {}", token.expose())))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(caller.uid, account.id);
		assert_eq!(caller.email, "admin@acme.com");
	}

	#[tokio::test]
	async fn test_resolve_caller_unknown_token_is_anonymous() {
		let identity = MemoryIdentityService::new();
		let caller = resolve_caller(&identity, &headers("Bearer rt_not_a_real_token"))
			.await
			.unwrap();
		assert!(caller.is_none());
	}
}
