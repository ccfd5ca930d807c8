//! Slack `chat.postMessage` client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use dealflow_common::config::SecretNames;
use dealflow_common::error::AppError;
use dealflow_common::secrets::{SecretStore, fetch_secret};

use crate::message::{Attachment, Block, ChatMessage};

/// Chat-post capability used by the notifier.
pub trait ChatPoster {
    fn post_message(
        &self,
        message: &ChatMessage,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Request body for `chat.postMessage`.
#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    blocks: &'a [Block],
    attachments: &'a [Attachment],
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API client bound to one channel.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_url: Arc<str>,
    bot_token: Arc<str>,
    channel_id: Arc<str>,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_url", &self.api_url)
            .field("bot_token", &"***")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

impl SlackClient {
    /// Every post is bounded by `timeout`.
    pub fn new(
        api_url: &str,
        bot_token: &str,
        channel_id: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
            channel_id: channel_id.into(),
        })
    }

    /// Fetch the bot token and channel id from the secret store.
    pub async fn from_secrets<S: SecretStore + Sync>(
        store: &S,
        names: &SecretNames,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let bot_token = fetch_secret(store, &names.slack_bot_token).await?;
        let channel_id = fetch_secret(store, &names.slack_channel_id).await?;
        Self::new(api_url, &bot_token, &channel_id, timeout)
    }
}

impl ChatPoster for SlackClient {
    async fn post_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        let request = PostMessageRequest {
            channel: &self.channel_id,
            blocks: &message.blocks,
            attachments: &message.attachments,
        };

        let response = self
            .http
            .post(self.api_url.as_ref())
            .bearer_auth(self.bot_token.as_ref())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            return Err(AppError::Chat(format!(
                "Slack API call failed: {} {}",
                status.as_u16(),
                text
            )));
        }

        let parsed: PostMessageResponse = serde_json::from_str(&text).map_err(|_| {
            AppError::Chat(format!("Slack API call failed: {} {}", status.as_u16(), text))
        })?;

        if !parsed.ok {
            return Err(AppError::Chat(format!(
                "Slack API call failed: {} {}",
                status.as_u16(),
                parsed.error.as_deref().unwrap_or("not ok")
            )));
        }

        Ok(())
    }
}
