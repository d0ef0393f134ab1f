// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::{response::IntoResponse, Json};
use serde_json::json;

/// GET /health - Liveness check.
pub async fn health_check() -> impl IntoResponse {
	Json(json!({ "status": "ok" }))
}
