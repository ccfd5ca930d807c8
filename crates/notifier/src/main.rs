//! Dealflow notifier binary entrypoint.

use std::num::NonZeroUsize;

use tower_http::trace::TraceLayer;

use dealflow_common::config::{AppConfig, QueueBackend};
use dealflow_common::queue::{QueueKeys, RedisQueue, connect_redis};
use dealflow_common::secrets::{AnySecretStore, fetch_secret};
use dealflow_common::telemetry;

use dealflow_notifier::consumer::QueueConsumer;
use dealflow_notifier::routes::create_router;
use dealflow_notifier::slack::SlackClient;
use dealflow_notifier::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("dealflow_notifier=info,dealflow_common=info,tower_http=info");

    tracing::info!("Starting Dealflow notifier...");

    let config = AppConfig::from_env()?;

    // Chat credentials are required before any message can be handled
    let store = AnySecretStore::from_config(&config).await;
    let slack = SlackClient::from_secrets(
        &store,
        &config.secret_names,
        &config.slack_api_url,
        config.slack_timeout(),
    )
    .await?;
    tracing::info!("Slack client ready");

    let consumer = match config.queue_backend {
        QueueBackend::Redis => {
            let key = fetch_secret(&store, &config.secret_names.queue_url).await?;
            let redis = connect_redis(&config.redis_url).await?;
            let batch_size = NonZeroUsize::new(config.notifier_batch_size)
                .ok_or_else(|| anyhow::anyhow!("NOTIFIER_BATCH_SIZE must be positive"))?;
            Some(QueueConsumer::new(
                RedisQueue::new(redis),
                QueueKeys::new(&key, &config.notifier_consumer_name),
                batch_size,
                slack.clone(),
            ))
        }
        QueueBackend::Sqs => None,
    };

    let app = create_router(AppState::new(slack)).layer(TraceLayer::new_for_http());

    tracing::info!("Notifier listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let server = async { axum::serve(listener, app).await };

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server exited with error");
                return Err(e.into());
            }
        }
        _ = async {
            match &consumer {
                Some(consumer) => consumer.run().await,
                None => std::future::pending().await,
            }
        } => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Dealflow notifier stopped.");
    Ok(())
}
