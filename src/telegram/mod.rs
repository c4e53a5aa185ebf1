pub mod payload;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::DeliveryTarget;
use payload::build_request;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

impl LinkButton {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// A formatted, delivery-ready message. With a photo the text becomes its caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub photo_url: Option<String>,
    pub button: LinkButton,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Resolves once the channel has accepted the message.
    async fn deliver(&self, target: &DeliveryTarget, message: &Message) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    api_url: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, target: &DeliveryTarget, message: &Message) -> Result<()> {
        let (method, body) = build_request(target, message);
        let url = format!("{}/bot{}/{}", self.api_url, target.bot_token, method);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to call Telegram {}", method))?;

        let status = response.status();
        let body_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        let reply: Option<ApiReply> = serde_json::from_str(&body_text).ok();

        match reply {
            Some(ApiReply { ok: true, .. }) if status.is_success() => {
                info!("Successfully sent Telegram {} to {}", method, target.chat_id);
                Ok(())
            }
            Some(ApiReply {
                description: Some(description),
                ..
            }) => {
                error!("Telegram {} failed with status {}: {}", method, status, description);
                Err(anyhow::anyhow!("Telegram {} failed: {} - {}", method, status, description))
            }
            _ => {
                error!("Telegram {} failed with status {}: {}", method, status, body_text);
                Err(anyhow::anyhow!("Telegram {} failed: {} - {}", method, status, body_text))
            }
        }
    }
}
