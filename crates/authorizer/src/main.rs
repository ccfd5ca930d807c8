//! Dealflow authorizer binary entrypoint.

use tower_http::trace::TraceLayer;

use dealflow_common::config::AppConfig;
use dealflow_common::secrets::AnySecretStore;
use dealflow_common::telemetry;

use dealflow_authorizer::credentials::ReferenceCredentials;
use dealflow_authorizer::routes::create_router;
use dealflow_authorizer::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("dealflow_authorizer=info,dealflow_common=info,tower_http=info");

    tracing::info!("Starting Dealflow authorizer...");

    let config = AppConfig::from_env()?;

    // Without reference credentials nothing can be authorized, so fail fast
    let store = AnySecretStore::from_config(&config).await;
    let credentials = ReferenceCredentials::load(&store, &config.secret_names).await?;
    tracing::info!("Reference credentials loaded");

    let state = AppState::new(credentials);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    tracing::info!("Authorizer listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
