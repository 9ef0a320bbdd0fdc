use anyhow::Context;

use navguard_api::config::ApiConfig;
use navguard_observability::ObservabilityConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    navguard_observability::init(&ObservabilityConfig::from_env());

    let config = ApiConfig::from_env()?;
    let catalog = config.load_catalog()?;
    let app = navguard_api::app::build_app(config.jwt_secret.clone(), catalog)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
