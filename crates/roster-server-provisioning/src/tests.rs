// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use proptest::prelude::*;
use roster_server_identity::{CallerIdentity, IdentityService, MemoryIdentityService, NewAccount, UserId};
use roster_server_store::{DocumentPath, DocumentStore, MemoryDocumentStore, StoreError};
use serde_json::json;

use super::*;

struct Fixture {
	identity: Arc<MemoryIdentityService>,
	store: Arc<MemoryDocumentStore>,
	service: ProvisioningService,
}

fn fixture() -> Fixture {
	let identity = Arc::new(MemoryIdentityService::new());
	let store = Arc::new(MemoryDocumentStore::new());
	let service = ProvisioningService::new(identity.clone(), store.clone());
	Fixture {
		identity,
		store,
		service,
	}
}

fn admin() -> CallContext {
	CallContext::signed_in(CallerIdentity {
		uid: UserId::new("admin-uid"),
		email: "admin@acme.com".to_string(),
	})
}

fn request(email: &str, company_id: &str) -> CreateCompanyUserRequest {
	serde_json::from_value(json!({
		"email": email,
		"password": "secret123",
		"companyId": company_id,
		"userData": {"name": "Ann", "role": "staff"},
	}))
	.unwrap()
}

fn path(p: &str) -> DocumentPath {
	DocumentPath::parse(p).unwrap()
}

#[tokio::test]
async fn provisions_account_and_both_records() {
	let f = fixture();

	let response = f
		.service
		.create_company_user(&admin(), request("ann@acme.com", "acme"))
		.await
		.unwrap();

	assert!(response.success);
	let account = f
		.identity
		.get_user_by_email("ann@acme.com")
		.await
		.unwrap()
		.unwrap();
	assert_eq!(account.id.as_str(), response.uid);

	let profile = f
		.store
		.get(&path(&format!("companies/acme/users/{}", response.uid)))
		.await
		.unwrap()
		.unwrap();
	assert_eq!(serde_json::Value::Object(profile), json!({"name": "Ann", "role": "staff"}));

	let index = f
		.store
		.get(&path(&format!("userCompany/{}", response.uid)))
		.await
		.unwrap()
		.unwrap();
	assert_eq!(
		serde_json::Value::Object(index),
		json!({"email": "ann@acme.com", "companyId": "acme"})
	);
}

#[tokio::test]
async fn empty_user_data_writes_empty_record() {
	let f = fixture();
	let mut req = request("bob@acme.com", "acme");
	req.user_data = Document::new();

	let response = f.service.create_company_user(&admin(), req).await.unwrap();

	let profile = f
		.store
		.get(&path(&format!("companies/acme/users/{}", response.uid)))
		.await
		.unwrap();
	assert_eq!(profile, Some(Document::new()));
}

#[tokio::test]
async fn anonymous_caller_is_rejected_without_side_effects() {
	let f = fixture();

	let err = f
		.service
		.create_company_user(&CallContext::anonymous(), request("ann@acme.com", "acme"))
		.await
		.unwrap_err();

	assert!(matches!(err, ProvisioningError::Unauthenticated));
	assert_eq!(f.identity.account_count(), 0);
	assert!(f.store.is_empty());
}

#[tokio::test]
async fn duplicate_email_is_already_exists_and_writes_nothing() {
	let f = fixture();
	f.identity
		.create_user(NewAccount::new("ann@acme.com", "secret123"))
		.await
		.unwrap();

	let err = f
		.service
		.create_company_user(&admin(), request("Ann@Acme.com", "acme"))
		.await
		.unwrap_err();

	assert!(matches!(err, ProvisioningError::AlreadyExists));
	assert_eq!(err.to_string(), "Email already in use");
	assert_eq!(f.store.write_count(), 0);
}

#[tokio::test]
async fn weak_password_is_creation_failure() {
	let f = fixture();
	let mut req = request("ann@acme.com", "acme");
	req.password = "123".into();

	let err = f.service.create_company_user(&admin(), req).await.unwrap_err();

	match err {
		ProvisioningError::CreationFailed(inner) => assert!(inner.is_rejected_input()),
		other => panic!("expected CreationFailed, got {other:?}"),
	}
	assert_eq!(f.identity.account_count(), 0);
	assert!(f.store.is_empty());
}

#[tokio::test]
async fn identity_outage_is_creation_failure() {
	let f = fixture();
	f.identity.fail_next_create("backend down");

	let err = f
		.service
		.create_company_user(&admin(), request("ann@acme.com", "acme"))
		.await
		.unwrap_err();

	match err {
		ProvisioningError::CreationFailed(inner) => assert!(!inner.is_rejected_input()),
		other => panic!("expected CreationFailed, got {other:?}"),
	}
	assert!(f.store.is_empty());
}

#[tokio::test]
async fn invalid_company_id_is_rejected_before_account_creation() {
	let f = fixture();

	let err = f
		.service
		.create_company_user(&admin(), request("ann@acme.com", "acme/evil"))
		.await
		.unwrap_err();

	assert!(matches!(err, ProvisioningError::InvalidRequest(_)));
	assert_eq!(f.identity.account_count(), 0);
}

#[tokio::test]
async fn profile_write_failure_leaves_orphaned_account() {
	let f = fixture();
	f.store.fail_writes_under("companies/", "quota exceeded");

	let err = f
		.service
		.create_company_user(&admin(), request("ann@acme.com", "acme"))
		.await
		.unwrap_err();

	assert!(matches!(err, ProvisioningError::Store(StoreError::Unavailable(_))));
	assert!(f
		.identity
		.get_user_by_email("ann@acme.com")
		.await
		.unwrap()
		.is_some());
	assert!(f.store.is_empty());
}

#[tokio::test]
async fn index_write_failure_keeps_profile_record() {
	let f = fixture();
	f.store.fail_writes_under("userCompany/", "quota exceeded");

	let err = f
		.service
		.create_company_user(&admin(), request("ann@acme.com", "acme"))
		.await
		.unwrap_err();

	assert!(matches!(err, ProvisioningError::Store(_)));
	assert_eq!(f.identity.account_count(), 1);
	assert_eq!(f.store.len(), 1);
}

#[test]
fn request_password_is_redacted_in_debug() {
	let req = request("ann@acme.com", "acme");
	let rendered = format!("{req:?}");
	assert!(!rendered.contains("secret123"));
}

#[test]
fn request_requires_user_data() {
	let parsed: Result<CreateCompanyUserRequest, _> = serde_json::from_value(json!({
		"email": "ann@acme.com",
		"password": "secret123",
		"companyId": "acme",
	}));
	assert!(parsed.is_err());
}

proptest! {
	#[test]
	fn company_ids_with_slashes_never_reach_identity(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
		let f = fixture();
		let result = tokio_test::block_on(
			f.service
				.create_company_user(&admin(), request("ann@acme.com", &format!("{a}/{b}"))),
		);
		prop_assert!(matches!(result, Err(ProvisioningError::InvalidRequest(_))));
		prop_assert_eq!(f.identity.account_count(), 0);
	}
}
