use axum::{routing::get, Router};

pub mod common;
pub mod menus;
pub mod navigation;
pub mod roles;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/menus", get(menus::get_menus).put(menus::put_menus))
        .nest("/roles", roles::router())
        .nest("/navigation", navigation::router())
}
