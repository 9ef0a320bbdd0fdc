//! `navguard-auth`: role permissions over the navigation forest.
//!
//! Pure in-memory logic: the cascade engine that keeps a role's permission
//! map consistent while it is edited, the projections handed to signed-in
//! sessions, and the checks that gate routes. No HTTP, no storage.

pub mod authorize;
pub mod cascade;
pub mod claims;
pub mod editor;
pub mod map;
pub mod permissions;
pub mod roles;
pub mod view;

pub use authorize::{
    AccessExplanation, AuthzError, SessionGrants, authorize_action, authorize_url,
    explain_url_access,
};
pub use cascade::{CascadeError, PermissionCascade};
pub use claims::{Hs256JwtValidator, JwtValidator, SessionClaims, TokenValidationError, validate_claims};
pub use editor::RoleEditor;
pub use map::PermissionMap;
pub use permissions::{CrudAction, PermissionRecord};
pub use roles::{RolePayload, RoleRecord, RoleScope};
pub use view::{CrudGrant, ReadPermissionView, has_read_permission};
