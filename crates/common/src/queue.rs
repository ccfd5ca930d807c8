//! Queue transport between the receiver and the notifier.
//!
//! The receiver only ever publishes; the notifier is normally pushed batches
//! by the platform, or pulls them from Redis through [`ReliableQueue`].

use std::future::Future;
use std::num::NonZeroUsize;

use aws_sdk_sqs::error::DisplayErrorContext;
use redis::{AsyncCommands, Direction};
use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::config::{AppConfig, QueueBackend};
use crate::error::AppError;

/// Publish capability used by the receiver.
pub trait QueuePublisher {
    /// Send `body` to the queue at `queue_url`, returning the message id.
    fn send(
        &self,
        queue_url: &str,
        body: &str,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// AWS SQS publisher.
#[derive(Clone)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
}

impl SqsQueue {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_sqs::Client::new(sdk_config),
        }
    }
}

impl QueuePublisher for SqsQueue {
    async fn send(&self, queue_url: &str, body: &str) -> Result<String, AppError> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| AppError::Queue(DisplayErrorContext(&e).to_string()))?;

        output
            .message_id()
            .map(str::to_string)
            .ok_or_else(|| AppError::Queue("SQS returned no message id".to_string()))
    }
}

/// Pull capability used by the notifier's Redis consumer.
///
/// Reserved messages sit in a processing list until they are acked,
/// requeued or dead-lettered, so a failed batch or a crash never drops them.
pub trait ReliableQueue {
    /// Move everything left in the processing list back onto the source, in
    /// original order. Returns how many messages were restored.
    fn recover(&self, keys: &QueueKeys) -> impl Future<Output = Result<usize, AppError>> + Send;

    /// Block up to `timeout_secs` for one message, then take up to `max - 1`
    /// more without blocking. Returns an empty batch on timeout.
    fn reserve(
        &self,
        keys: &QueueKeys,
        max: NonZeroUsize,
        timeout_secs: f64,
    ) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    /// Drop delivered messages from the processing list.
    fn ack(
        &self,
        keys: &QueueKeys,
        bodies: &[String],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Put unattempted messages back at the head of the source, oldest first.
    fn requeue(
        &self,
        keys: &QueueKeys,
        bodies: &[String],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Park a message that could not be delivered in the failed list.
    fn dead_letter(
        &self,
        keys: &QueueKeys,
        body: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Redis keys used by one consumer of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueKeys {
    /// List the receiver publishes to
    pub source: String,
    /// In-flight messages of this consumer
    pub processing: String,
    /// Messages that failed delivery
    pub failed: String,
}

impl QueueKeys {
    /// `consumer` must stay stable across restarts so [`ReliableQueue::recover`]
    /// finds what a previous run left in flight.
    pub fn new(source: &str, consumer: &str) -> Self {
        Self {
            source: source.to_string(),
            processing: format!("{}:processing:{}", source, consumer),
            failed: format!("{}:failed", source),
        }
    }
}

/// Redis list used as a queue. The queue URL is the list key.
///
/// Producers `LPUSH`, consumers take from the right, so messages are consumed
/// in the order they were published.
#[derive(Clone)]
pub struct RedisQueue {
    redis: ConnectionManager,
}

impl RedisQueue {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

impl ReliableQueue for RedisQueue {
    async fn recover(&self, keys: &QueueKeys) -> Result<usize, AppError> {
        let mut redis = self.redis.clone();
        let mut restored = 0;

        // newest in-flight sits on the left; each move lands behind the last
        // one on the consuming end, so the oldest ends up next in line
        loop {
            let moved: Option<String> = redis
                .lmove(&keys.processing, &keys.source, Direction::Left, Direction::Right)
                .await?;
            if moved.is_none() {
                break;
            }
            restored += 1;
        }

        Ok(restored)
    }

    async fn reserve(
        &self,
        keys: &QueueKeys,
        max: NonZeroUsize,
        timeout_secs: f64,
    ) -> Result<Vec<String>, AppError> {
        let mut redis = self.redis.clone();

        let first: Option<String> = redis
            .blmove(
                &keys.source,
                &keys.processing,
                Direction::Right,
                Direction::Left,
                timeout_secs,
            )
            .await?;
        let Some(body) = first else {
            return Ok(Vec::new());
        };

        let mut batch = vec![body];
        while batch.len() < max.get() {
            let next: Option<String> = redis
                .lmove(&keys.source, &keys.processing, Direction::Right, Direction::Left)
                .await?;
            match next {
                Some(body) => batch.push(body),
                None => break,
            }
        }

        Ok(batch)
    }

    async fn ack(&self, keys: &QueueKeys, bodies: &[String]) -> Result<(), AppError> {
        if bodies.is_empty() {
            return Ok(());
        }

        let mut redis = self.redis.clone();
        let mut pipe = redis::pipe();
        for body in bodies {
            pipe.lrem(&keys.processing, 1, body).ignore();
        }
        let () = pipe.query_async(&mut redis).await?;
        Ok(())
    }

    async fn requeue(&self, keys: &QueueKeys, bodies: &[String]) -> Result<(), AppError> {
        if bodies.is_empty() {
            return Ok(());
        }

        let mut redis = self.redis.clone();
        let mut pipe = redis::pipe();
        pipe.atomic();
        for body in bodies {
            pipe.lrem(&keys.processing, 1, body).ignore();
        }
        // RPUSH newest first so the oldest is the next one taken
        let reversed: Vec<&String> = bodies.iter().rev().collect();
        pipe.rpush(&keys.source, reversed).ignore();
        let () = pipe.query_async(&mut redis).await?;
        Ok(())
    }

    async fn dead_letter(&self, keys: &QueueKeys, body: &str) -> Result<(), AppError> {
        let mut redis = self.redis.clone();
        let () = redis::pipe()
            .atomic()
            .lrem(&keys.processing, 1, body)
            .ignore()
            .lpush(&keys.failed, body)
            .ignore()
            .query_async(&mut redis)
            .await?;
        Ok(())
    }
}

/// Create a Redis connection manager for async operations.
pub async fn connect_redis(redis_url: &str) -> Result<ConnectionManager, AppError> {
    let client = redis::Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;

    tracing::info!("Connected to Redis");
    Ok(manager)
}

/// Queue publisher selected by configuration.
#[derive(Clone)]
pub enum AnyQueue {
    Sqs(SqsQueue),
    Redis(RedisQueue),
}

impl AnyQueue {
    /// Build the publisher named by `config.queue_backend`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        match config.queue_backend {
            QueueBackend::Sqs => {
                let sdk_config =
                    aws_config::defaults(aws_config::BehaviorVersion::latest()).load().await;
                tracing::info!("Using SQS queue backend");
                Ok(AnyQueue::Sqs(SqsQueue::new(&sdk_config)))
            }
            QueueBackend::Redis => {
                let redis = connect_redis(&config.redis_url).await?;
                tracing::info!("Using Redis queue backend");
                Ok(AnyQueue::Redis(RedisQueue::new(redis)))
            }
        }
    }
}

impl QueuePublisher for AnyQueue {
    async fn send(&self, queue_url: &str, body: &str) -> Result<String, AppError> {
        match self {
            AnyQueue::Sqs(queue) => queue.send(queue_url, body).await,
            AnyQueue::Redis(queue) => queue.send(queue_url, body).await,
        }
    }
}
