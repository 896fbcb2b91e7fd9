//! Payroll API Library
//!
//! Payslip computation and approval workflow engine: statutory deduction
//! calculation, payslip snapshot generation, and a multi-party
//! approve/reject/revert state machine with an append-only audit trail.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod period;
pub mod services;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// App state definition. The services hold the connection pool and event
// sender themselves; state carries only what the handlers read.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "ListQuery::default_page")]
    pub page: u64,
    #[serde(default = "ListQuery::default_limit")]
    pub limit: u64,
}

impl ListQuery {
    pub fn default_page() -> u64 {
        1
    }

    pub fn default_limit() -> u64 {
        20
    }
}

// Common response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Assembles the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/payslips", handlers::payslips::routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_wraps_data() {
        let response = ApiResponse::success_with_message(42, "done");
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert_eq!(response.message.as_deref(), Some("done"));
    }

    #[test]
    fn list_query_defaults() {
        assert_eq!(ListQuery::default_page(), 1);
        assert_eq!(ListQuery::default_limit(), 20);
    }
}
