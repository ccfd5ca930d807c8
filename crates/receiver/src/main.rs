//! Dealflow webhook receiver binary entrypoint.

use tower_http::trace::TraceLayer;

use dealflow_authorizer::credentials::ReferenceCredentials;
use dealflow_common::config::AppConfig;
use dealflow_common::queue::AnyQueue;
use dealflow_common::secrets::{AnySecretStore, fetch_secret};
use dealflow_common::telemetry;

use dealflow_receiver::routes::create_router;
use dealflow_receiver::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("dealflow_receiver=info,dealflow_common=info,tower_http=info");

    tracing::info!("Starting Dealflow webhook receiver...");

    let config = AppConfig::from_env()?;

    // The queue URL is a secret; without it nothing can be forwarded
    let store = AnySecretStore::from_config(&config).await;
    let queue_url = fetch_secret(&store, &config.secret_names.queue_url).await?;
    let credentials = ReferenceCredentials::load(&store, &config.secret_names).await?;
    tracing::info!("Webhook credentials loaded");

    let queue = AnyQueue::from_config(&config).await?;
    tracing::info!("Queue publisher ready");

    let state = AppState::new(queue, queue_url, credentials);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    tracing::info!("Receiver listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
