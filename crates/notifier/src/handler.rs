//! Queue-batch handler: one chat notification per message.
//!
//! Messages are handled strictly in delivery order. The first failure stops
//! the batch; messages already posted stay posted.

use dealflow_common::error::AppError;
use dealflow_common::types::{ApiResponse, QueueEvent, QueueRecord};

use crate::message::{ChatMessage, DealSummary};
use crate::slack::ChatPoster;

pub const MSG_SENT: &str = "Slack notification sent successfully.";

/// Where and why a batch stopped.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the failing record; records before it were delivered.
    pub index: usize,
    pub error: AppError,
}

/// Handle one batch of queue messages.
pub async fn handle<P: ChatPoster + Sync>(event: &QueueEvent, poster: &P) -> ApiResponse {
    match process_batch(event, poster).await {
        Ok(()) => ApiResponse::ok(MSG_SENT),
        Err(_) => ApiResponse::internal_error(),
    }
}

/// Notify for each record in order, stopping at the first failure.
pub async fn process_batch<P: ChatPoster + Sync>(
    event: &QueueEvent,
    poster: &P,
) -> Result<(), BatchFailure> {
    for (index, record) in event.records.iter().enumerate() {
        if let Err(error) = notify(record, poster).await {
            tracing::error!(
                error = %error,
                index,
                message_id = record.message_id.as_deref().unwrap_or("-"),
                batch_size = event.records.len(),
                "Error processing queue message"
            );
            return Err(BatchFailure { index, error });
        }
    }

    tracing::info!(count = event.records.len(), "Queue batch processed");
    Ok(())
}

async fn notify<P: ChatPoster + Sync>(record: &QueueRecord, poster: &P) -> Result<(), AppError> {
    let deal = DealSummary::from_message(&record.body)?;

    tracing::info!(
        message_id = record.message_id.as_deref().unwrap_or("-"),
        title = %deal.title,
        state = %deal.state,
        "Processing queue message"
    );

    poster.post_message(&ChatMessage::for_deal(&deal)).await?;
    tracing::info!("Slack message posted successfully");
    Ok(())
}
