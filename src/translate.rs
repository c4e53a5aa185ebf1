use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Language the Real Madrid channel is published in.
pub const TARGET_LANGUAGE: &str = "ar";

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Client for the public `translate_a/single` endpoint, source language auto-detected.
pub struct GoogleTranslator {
    client: Client,
    api_url: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, api_url: &str, target: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            target: target.to_string(),
        }
    }
}

/// Join the translated segments of a `translate_a/single` reply.
fn parse_reply(data: &Value) -> Option<String> {
    let segments = data.get(0)?.as_array()?;
    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        None
    } else {
        Some(translated)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let query = serde_urlencoded::to_string([
            ("client", "gtx"),
            ("sl", "auto"),
            ("tl", self.target.as_str()),
            ("dt", "t"),
            ("q", text),
        ])?;
        let url = format!("{}?{}", self.api_url, query);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Translation request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Translation service returned {}", response.status()));
        }

        let data: Value = response.json().await.context("Translation reply was not JSON")?;
        let translated = parse_reply(&data).ok_or_else(|| anyhow!("Translation reply had no text"))?;

        debug!("Translated {} chars into {}", text.chars().count(), self.target);
        Ok(translated)
    }
}
