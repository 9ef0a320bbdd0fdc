//! Url normalisation and node matching for route protection.

/// Strip the query string (and fragment) and any trailing slashes.
///
/// The root path stays `/`.
pub fn normalize_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Does `candidate` fall under the registered node url `node_url`?
///
/// Exact match, or prefix match on a `/` boundary, after normalising both
/// sides. `/controls/branches/edit/42` matches `/controls/branches`, while
/// `/controls/branchesX` does not. An empty node url never matches.
pub fn url_matches(candidate: &str, node_url: &str) -> bool {
    let candidate = normalize_url(candidate);
    let node = normalize_url(node_url);
    if node.is_empty() {
        return false;
    }
    if candidate == node {
        return true;
    }
    if node == "/" {
        return false;
    }
    candidate
        .strip_prefix(node)
        .is_some_and(|rest| rest.starts_with('/'))
}
