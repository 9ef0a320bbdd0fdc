use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    /// Two nodes in the forest share a url; urls are the only node identity.
    #[error("duplicate navigation url '{0}'")]
    DuplicateUrl(String),

    #[error("navigation node without url (parent: {parent:?})")]
    EmptyUrl { parent: Option<String> },

    #[error("malformed navigation document: {0}")]
    Json(#[from] serde_json::Error),
}
