//! HTTP API Layer
//!
//! REST surface of the platform, built on Axum over the in-memory store.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each domain
//! - **Auth**: Trusted-header identity extractors
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(store, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use infra_mem::InMemoryStore;

use crate::config::ApiConfig;
use crate::handlers::{coverage, health, payments, reimbursements, reports};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: InMemoryStore,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(store: InMemoryStore, config: ApiConfig) -> Router {
    let state = AppState { store, config };

    // Public routes (no identity header required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Reimbursement routes (patient identity)
    let reimbursement_routes = Router::new()
        .route(
            "/eligible-sessions",
            get(reimbursements::list_eligible_sessions),
        )
        .route("/", post(reimbursements::create_request))
        .route("/", get(reimbursements::list_requests))
        .route("/:id", get(reimbursements::get_request))
        .route("/:id", patch(reimbursements::update_request));

    // Report routes (professional identity)
    let report_routes = Router::new()
        .route("/:year/:month", get(reports::get_report))
        .route("/:year/:month/csv", get(reports::get_report_csv));

    // Coverage guide routes (public reference data)
    let coverage_routes = Router::new()
        .route("/", get(coverage::list_guide))
        .route("/:slug", get(coverage::get_guide_entry));

    let api_routes = Router::new()
        .nest("/reimbursements", reimbursement_routes)
        .nest("/reports", report_routes)
        .nest("/coverage-guide", coverage_routes)
        .route("/payments/webhook", post(payments::webhook));

    Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
