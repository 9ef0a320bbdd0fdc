use navguard_auth::SessionGrants;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{PrincipalContext, TenantContext};

/// Grants of the calling session, or the error response to return.
pub fn session_grants(
    services: &AppServices,
    tenant: &TenantContext,
    principal: &PrincipalContext,
) -> Result<SessionGrants, axum::response::Response> {
    services
        .grants(tenant.tenant_id(), principal)
        .map_err(errors::service_error_to_response)
}
