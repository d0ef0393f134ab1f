// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Company user provisioning.
//!
//! [`ProvisioningService::create_company_user`] creates an identity account
//! and the two records that tie it to a company:
//!
//! ```text
//! companies/{companyId}/users/{uid}   <- userData (overwritten, not merged)
//! userCompany/{uid}                   <- {email, companyId}
//! ```
//!
//! The three steps run in order and are not transactional. If a document
//! write fails, the error is returned and the account stays behind without
//! (some of) its records.

pub mod error;

pub use error::ProvisioningError;

use std::sync::Arc;

use roster_common_config::SecretString;
use roster_server_identity::{CallerIdentity, IdentityError, IdentityService, NewAccount};
use roster_server_store::{CollectionPath, Document, DocumentStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

/// Top-level collection holding one document per company.
pub const COMPANIES_COLLECTION: &str = "companies";
/// Per-company subcollection holding user profiles.
pub const COMPANY_USERS_COLLECTION: &str = "users";
/// Index from user id to company.
pub const USER_COMPANY_COLLECTION: &str = "userCompany";

/// Input of the provisioning call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyUserRequest {
	pub email: String,
	pub password: SecretString,
	pub company_id: String,
	/// Arbitrary profile fields stored verbatim.
	pub user_data: Document,
}

/// Output of a successful provisioning call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCompanyUserResponse {
	pub success: bool,
	pub uid: String,
}

/// Metadata attached to an inbound call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
	/// The signed-in caller, if any.
	pub auth: Option<CallerIdentity>,
}

impl CallContext {
	pub fn anonymous() -> Self {
		Self { auth: None }
	}

	pub fn signed_in(caller: CallerIdentity) -> Self {
		Self { auth: Some(caller) }
	}
}

fn company_users(company_id: &str) -> Result<CollectionPath, ProvisioningError> {
	CollectionPath::root(COMPANIES_COLLECTION)
		.and_then(|c| c.doc(company_id))
		.and_then(|d| d.collection(COMPANY_USERS_COLLECTION))
		.map_err(|e| ProvisioningError::InvalidRequest(format!("companyId: {e}")))
}

/// Provisioning handler. Holds the shared collaborator handles.
#[derive(Clone)]
pub struct ProvisioningService {
	identity: Arc<dyn IdentityService>,
	store: Arc<dyn DocumentStore>,
}

impl ProvisioningService {
	pub fn new(identity: Arc<dyn IdentityService>, store: Arc<dyn DocumentStore>) -> Self {
		Self { identity, store }
	}

	/// Create an account in the identity service and link it to a company.
	///
	/// Only requires a signed-in caller. Whether the caller administers
	/// `company_id` is not checked.
	///
	/// # Errors
	///
	/// - [`ProvisioningError::Unauthenticated`] without a caller; nothing is written
	/// - [`ProvisioningError::InvalidRequest`] if `company_id` is not a valid path segment
	/// - [`ProvisioningError::AlreadyExists`] if the email is registered; nothing is written
	/// - [`ProvisioningError::CreationFailed`] for any other identity failure
	/// - [`ProvisioningError::Store`] if a write fails after the account exists
	#[instrument(
		skip(self, ctx, request),
		fields(company_id = %request.company_id, caller = ctx.auth.as_ref().map(|c| c.uid.to_string()))
	)]
	pub async fn create_company_user(
		&self,
		ctx: &CallContext,
		request: CreateCompanyUserRequest,
	) -> Result<CreateCompanyUserResponse, ProvisioningError> {
		if ctx.auth.is_none() {
			return Err(ProvisioningError::Unauthenticated);
		}

		// Reject a malformed companyId before anything is created.
		let users = company_users(&request.company_id)?;

		let CreateCompanyUserRequest {
			email,
			password,
			company_id,
			user_data,
		} = request;

		let account = match self
			.identity
			.create_user(NewAccount {
				email: email.clone(),
				password,
			})
			.await
		{
			Ok(account) => account,
			Err(IdentityError::EmailExists(_)) => {
				info!("email already registered");
				return Err(ProvisioningError::AlreadyExists);
			}
			Err(e) => {
				warn!(error = %e, "account creation failed");
				return Err(ProvisioningError::CreationFailed(e));
			}
		};
		let uid = account.id.to_string();

		let company_user = users.doc(&uid)?;
		let user_company = CollectionPath::root(USER_COMPANY_COLLECTION)?.doc(&uid)?;

		if let Err(e) = self.store.set(&company_user, user_data).await {
			error!(uid = %uid, path = %company_user, error = %e, "company user write failed; account left without records");
			return Err(e.into());
		}

		let mut index = Document::new();
		index.insert("email".to_string(), Value::String(email));
		index.insert("companyId".to_string(), Value::String(company_id));
		if let Err(e) = self.store.set(&user_company, index).await {
			error!(uid = %uid, path = %user_company, error = %e, "user company index write failed; account left partially provisioned");
			return Err(e.into());
		}

		info!(uid = %uid, "company user provisioned");
		Ok(CreateCompanyUserResponse { success: true, uid })
	}
}

#[cfg(test)]
mod tests;
