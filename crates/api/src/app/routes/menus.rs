use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use navguard_navigation::NavigationTree;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{PrincipalContext, TenantContext};

/// GET /menus - the tenant's subscribed navigation forest, unfiltered.
pub async fn get_menus(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    let menus = services.menus(tenant.tenant_id());
    Json(menus.tree.as_ref().clone()).into_response()
}

/// PUT /menus - replace the tenant's subscription. Tenant owner only.
///
/// The body is read leniently: malformed sections or items are skipped.
pub async fn put_menus(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    if !principal.is_tenant_owner() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only the tenant owner can change subscribed menus",
        );
    }

    let tree = NavigationTree::from_json_value(body);
    match services.subscribe_menus(tenant.tenant_id(), tree) {
        Ok(menus) => Json(serde_json::json!({
            "nodes": menus.index.len(),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
