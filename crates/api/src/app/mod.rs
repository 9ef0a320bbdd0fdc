//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: tenant-scoped menus, roles and session grants
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses
//! - `catalog.rs`: built-in menus

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use navguard_navigation::{NavError, NavigationTree};

use crate::middleware;

pub mod catalog;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails when `catalog` cannot be indexed (empty or duplicate urls).
pub fn build_app(jwt_secret: String, catalog: NavigationTree) -> Result<Router, NavError> {
    let jwt = Arc::new(navguard_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::AppServices::new(catalog)?);

    // Protected routes: require auth + tenant context.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new()))
}
