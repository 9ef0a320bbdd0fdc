//! `navguard-core`: shared identifiers and the domain error model.
//!
//! Nothing in here knows about navigation trees or permissions; it is the
//! vocabulary the other crates agree on.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{BranchId, PrincipalId, RoleId, TenantId};
