//! Session-time views of the tenant's navigation.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use navguard_auth::explain_url_access;
use navguard_navigation::NavigationFilter;

use crate::app::dto;
use crate::app::routes::common::session_grants;
use crate::app::services::AppServices;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(filtered_navigation))
        .route("/landing", get(landing))
        .route("/access", get(access))
        .route("/summary", get(summary))
}

/// GET /navigation - the forest with everything the session cannot reach removed.
pub async fn filtered_navigation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let grants = match session_grants(&services, &tenant, &principal) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let menus = services.menus(tenant.tenant_id());
    Json(NavigationFilter::new(&grants).filter_tree(&menus.tree)).into_response()
}

/// GET /navigation/landing - where to send the session after login.
pub async fn landing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let grants = match session_grants(&services, &tenant, &principal) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let menus = services.menus(tenant.tenant_id());
    let url = NavigationFilter::new(&grants)
        .first_accessible_url(menus.tree.sections())
        .map(str::to_string);
    Json(dto::LandingResponse { url }).into_response()
}

/// GET /navigation/access?url= - route guard decision with its explanation.
pub async fn access(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::AccessQuery>,
) -> axum::response::Response {
    let grants = match session_grants(&services, &tenant, &principal) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let menus = services.menus(tenant.tenant_id());
    Json(explain_url_access(&menus.tree, &grants, &query.url)).into_response()
}

/// GET /navigation/summary - visible vs. denied counts per section.
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let grants = match session_grants(&services, &tenant, &principal) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let menus = services.menus(tenant.tenant_id());
    Json(NavigationFilter::new(&grants).permission_summary(menus.tree.sections())).into_response()
}
