use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use navguard_auth::PermissionMap;

use crate::app::services::EditorAction;

#[derive(Debug, Deserialize)]
pub struct EditorToggleRequest {
    #[serde(default)]
    pub permissions: PermissionMap,
    pub url: String,
    pub action: EditorAction,
}

#[derive(Debug, Serialize)]
pub struct EditorToggleResponse {
    pub permissions: PermissionMap,
    pub expanded: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    /// `None` when the session can read nothing.
    pub url: Option<String>,
}
