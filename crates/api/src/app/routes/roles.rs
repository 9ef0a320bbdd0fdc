//! Role management and the stateless permission editor.
//!
//! Every endpoint is gated by the caller's own grants on the roles node.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use navguard_auth::{CrudAction, RolePayload, authorize_action};
use navguard_core::RoleId;

use crate::app::catalog::ROLES_NODE_URL;
use crate::app::routes::common::session_grants;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/editor/toggle", post(toggle))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
}

fn guard(
    services: &AppServices,
    tenant: &TenantContext,
    principal: &PrincipalContext,
    action: CrudAction,
) -> Result<(), axum::response::Response> {
    let grants = session_grants(services, tenant, principal)?;
    authorize_action(&grants, ROLES_NODE_URL, action).map_err(errors::authz_error_to_response)
}

fn parse_role_id(id: &str) -> Result<RoleId, axum::response::Response> {
    RoleId::from_str(id).map_err(errors::domain_error_to_response)
}

/// GET /roles
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &tenant, &principal, CrudAction::Read) {
        return resp;
    }
    Json(services.list_roles(tenant.tenant_id())).into_response()
}

/// GET /roles/:id
pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &tenant, &principal, CrudAction::Read) {
        return resp;
    }
    let role_id = match parse_role_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.get_role(tenant.tenant_id(), role_id) {
        Ok(role) => Json(role).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /roles
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<RolePayload>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &tenant, &principal, CrudAction::Add) {
        return resp;
    }

    match services.create_role(tenant.tenant_id(), body) {
        Ok(role) => (StatusCode::CREATED, Json(role)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// PUT /roles/:id
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<RolePayload>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &tenant, &principal, CrudAction::Update) {
        return resp;
    }
    let role_id = match parse_role_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.update_role(tenant.tenant_id(), role_id, body) {
        Ok(role) => Json(role).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// DELETE /roles/:id
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &tenant, &principal, CrudAction::Delete) {
        return resp;
    }
    let role_id = match parse_role_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.delete_role(tenant.tenant_id(), role_id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /roles/editor/toggle - apply one editor interaction to a working map.
///
/// Nothing is stored; the client keeps the returned map for the next call.
pub async fn toggle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::EditorToggleRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &tenant, &principal, CrudAction::Read) {
        return resp;
    }

    match services.apply_editor_action(tenant.tenant_id(), &body.permissions, &body.url, body.action) {
        Ok((permissions, expanded)) => Json(dto::EditorToggleResponse {
            permissions,
            expanded,
        })
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
