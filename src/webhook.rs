//! Discord webhook notifications for new items.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::NotifyError;

/// Accent color of the embed (blue).
pub const EMBED_COLOR: u32 = 0x0034_98db;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one message about a new item. An error means the item was not
    /// delivered and should be tried again on the next run.
    async fn notify(
        &self,
        creator: &str,
        item_url: &str,
        image_url: Option<&str>,
    ) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EmbedImage {
    pub url: String,
}

pub fn title_for(creator: &str) -> String {
    format!("New TSR Post by {creator}")
}

impl WebhookPayload {
    pub fn new(creator: &str, item_url: &str, image_url: Option<&str>) -> Self {
        Self {
            embeds: vec![Embed {
                title: title_for(creator),
                url: item_url.to_string(),
                description: item_url.to_string(),
                color: EMBED_COLOR,
                image: image_url.map(|url| EmbedImage {
                    url: url.to_string(),
                }),
            }],
        }
    }
}

pub struct DiscordWebhook {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(
        &self,
        creator: &str,
        item_url: &str,
        image_url: Option<&str>,
    ) -> Result<(), NotifyError> {
        let payload = WebhookPayload::new(creator, item_url, image_url);
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        debug!(creator, item = item_url, "webhook accepted message");
        Ok(())
    }
}

/// Logs the message instead of posting it.
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn notify(
        &self,
        creator: &str,
        item_url: &str,
        image_url: Option<&str>,
    ) -> Result<(), NotifyError> {
        info!(
            title = %title_for(creator),
            item = item_url,
            image = image_url.unwrap_or("-"),
            "dry run, not posting"
        );
        Ok(())
    }
}
