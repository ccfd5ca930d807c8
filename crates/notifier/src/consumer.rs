//! Pull consumer for the Redis queue backend.
//!
//! With SQS the platform pushes batches to `/invoke`; with Redis nothing does,
//! so this loop reserves batches itself and feeds them to the same handler.
//! Every reserved message is settled after the batch: delivered ones are
//! acked, the one that failed is dead-lettered and the unattempted rest go
//! back to the queue.

use std::num::NonZeroUsize;
use std::time::Duration;

use dealflow_common::error::AppError;
use dealflow_common::queue::{QueueKeys, ReliableQueue};
use dealflow_common::types::QueueEvent;

use crate::handler;
use crate::slack::ChatPoster;

/// How long one blocking reserve waits before looping.
const POP_TIMEOUT_SECS: f64 = 5.0;

/// Pause after a Redis error before reserving again.
const ERROR_PAUSE: Duration = Duration::from_secs(1);

/// How one reserved batch was settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub delivered: usize,
    pub dead_lettered: usize,
    pub requeued: usize,
}

pub struct QueueConsumer<Q, P> {
    queue: Q,
    keys: QueueKeys,
    batch_size: NonZeroUsize,
    poster: P,
}

impl<Q, P> QueueConsumer<Q, P>
where
    Q: ReliableQueue + Sync,
    P: ChatPoster + Sync,
{
    pub fn new(queue: Q, keys: QueueKeys, batch_size: NonZeroUsize, poster: P) -> Self {
        Self {
            queue,
            keys,
            batch_size,
            poster,
        }
    }

    /// Consume until the task is dropped.
    pub async fn run(&self) {
        tracing::info!(
            key = %self.keys.source,
            processing = %self.keys.processing,
            batch_size = self.batch_size.get(),
            "Queue consumer started"
        );

        match self.queue.recover(&self.keys).await {
            Ok(0) => {}
            Ok(restored) => {
                tracing::warn!(restored, "Restored in-flight messages from a previous run")
            }
            Err(e) => tracing::error!(error = %e, "Failed to restore in-flight messages"),
        }

        loop {
            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "Queue consumer error");
                tokio::time::sleep(ERROR_PAUSE).await;
            }
        }
    }

    /// Reserve one batch, deliver it and settle every message in it.
    pub async fn run_once(&self) -> Result<BatchOutcome, AppError> {
        let bodies = self
            .queue
            .reserve(&self.keys, self.batch_size, POP_TIMEOUT_SECS)
            .await?;

        if bodies.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let event = QueueEvent::from_bodies(bodies.iter().cloned());
        let Err(failure) = handler::process_batch(&event, &self.poster).await else {
            self.queue.ack(&self.keys, &bodies).await?;
            return Ok(BatchOutcome {
                delivered: bodies.len(),
                ..Default::default()
            });
        };

        let index = failure.index;
        let (delivered, rest) = bodies.split_at(index);
        let (failed, unattempted) = rest.split_at(1);

        self.queue.ack(&self.keys, delivered).await?;
        self.queue.dead_letter(&self.keys, &failed[0]).await?;
        self.queue.requeue(&self.keys, unattempted).await?;

        let outcome = BatchOutcome {
            delivered: delivered.len(),
            dead_lettered: 1,
            requeued: unattempted.len(),
        };
        tracing::warn!(
            delivered = outcome.delivered,
            requeued = outcome.requeued,
            failed_key = %self.keys.failed,
            "Queue batch failed, message moved to failed list"
        );
        Ok(outcome)
    }
}
