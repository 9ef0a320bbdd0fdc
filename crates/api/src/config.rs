//! Process configuration, read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use navguard_navigation::NavigationTree;

use crate::app::catalog;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,

    /// JSON document holding the subscribed menus. The built-in catalog is
    /// served when unset.
    pub menus_path: Option<PathBuf>,
}

impl ApiConfig {
    /// `NAVGUARD_BIND`, `JWT_SECRET` and `NAVGUARD_MENUS_PATH`.
    pub fn from_env() -> anyhow::Result<Self> {
        let bind = std::env::var("NAVGUARD_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("NAVGUARD_BIND is not a socket address: {bind}"))?;

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let menus_path = std::env::var_os("NAVGUARD_MENUS_PATH").map(PathBuf::from);

        Ok(Self {
            bind_addr,
            jwt_secret,
            menus_path,
        })
    }

    /// The menus every tenant is subscribed to.
    pub fn load_catalog(&self) -> anyhow::Result<NavigationTree> {
        let Some(path) = &self.menus_path else {
            return Ok(catalog::builtin());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read menus from {}", path.display()))?;
        let tree = NavigationTree::from_json_str(&raw)
            .with_context(|| format!("menus file {} is not valid JSON", path.display()))?;

        tracing::info!(path = %path.display(), nodes = tree.node_count(), "loaded menus");
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(menus_path: Option<PathBuf>) -> ApiConfig {
        ApiConfig {
            bind_addr: DEFAULT_BIND.parse().unwrap(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            menus_path,
        }
    }

    #[test]
    fn builtin_catalog_without_path() {
        let tree = config(None).load_catalog().unwrap();
        assert!(!tree.is_empty());
    }

    #[test]
    fn menus_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("navguard-menus-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "mainNavigation": [ { "title": "Main", "items": [ { "url": "/reports", "title": "Reports" } ] } ] }"#,
        )
        .unwrap();

        let tree = config(Some(path.clone())).load_catalog().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn missing_menus_file_is_an_error() {
        let err = config(Some(PathBuf::from("/nonexistent/navguard/menus.json")))
            .load_catalog()
            .unwrap_err();
        assert!(err.to_string().contains("failed to read menus"));
    }
}
