//! HTTP API Layer
//!
//! This crate provides the REST API for the benefit waterfall simulator
//! using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Catalog lookups, simulations, comparisons and premiums
//! - **Middleware**: Request logging, tracing and CORS
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! Plans and scenarios are loaded once at startup and shared read-only
//! between requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(plans, scenarios, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_plan::PlanCatalog;
use domain_scenario::ScenarioCatalog;

use crate::config::ApiConfig;
use crate::handlers::{health, plans, premiums, scenarios, simulations};
use crate::middleware::request_logging_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub plans: Arc<PlanCatalog>,
    pub scenarios: Arc<ScenarioCatalog>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `plans` - Resolved plan catalog
/// * `scenarios` - Validated scenario catalog
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(plans: PlanCatalog, scenarios: ScenarioCatalog, config: ApiConfig) -> Router {
    let state = AppState {
        plans: Arc::new(plans),
        scenarios: Arc::new(scenarios),
        config,
    };

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let plan_routes = Router::new()
        .route("/", get(plans::list_plans))
        .route("/:code", get(plans::get_plan))
        .route("/:code/related", get(plans::related_plans));

    let scenario_routes = Router::new()
        .route("/", get(scenarios::list_scenarios))
        .route("/:code", get(scenarios::get_scenario));

    let simulation_routes = Router::new()
        .route("/", post(simulations::run_simulation))
        .route("/compare", post(simulations::compare_plans));

    let premium_routes = Router::new()
        .route("/resolve", post(premiums::resolve))
        .route("/volatility", post(premiums::volatility));

    let api_routes = Router::new()
        .nest("/plans", plan_routes)
        .nest("/scenarios", scenario_routes)
        .nest("/simulations", simulation_routes)
        .nest("/premiums", premium_routes)
        .layer(axum_middleware::from_fn(request_logging_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
