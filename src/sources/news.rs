use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::error::{FetchError, SkipReason};
use crate::formatter::news_caption;
use crate::models::{Item, ItemKey};
use crate::sources::{Extraction, Source};
use crate::telegram::{LinkButton, Message};
use crate::translate::Translator;
use crate::utils::http::fetch_text;

/// Fields pulled from an article page before any translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub body: String,
    pub image_url: String,
}

/// Structural rules for one news site.
pub trait PageRules: Send + Sync {
    /// Article links in page order, resolved against `base_url`.
    fn listing_links(&self, document: &Html, base_url: &str) -> Vec<String>;

    /// Title, body and lead image of an article page.
    fn parse_article(&self, document: &Html, page_url: &str) -> Result<RawArticle, SkipReason>;

    /// Whether title and body go through the translator.
    fn translates(&self) -> bool {
        false
    }

    fn body_limit(&self) -> Option<usize> {
        None
    }
}

/// A news site: listing page of article links, one detail page per article.
pub struct NewsSource<R: PageRules> {
    config: BotConfig,
    rules: R,
    translator: Option<Arc<dyn Translator>>,
}

impl<R: PageRules> NewsSource<R> {
    pub fn new(config: BotConfig, rules: R) -> Self {
        Self {
            config,
            rules,
            translator: None,
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    async fn translate(&self, raw: RawArticle) -> Result<RawArticle, SkipReason> {
        if !self.rules.translates() {
            return Ok(raw);
        }

        let translator = self
            .translator
            .as_ref()
            .ok_or_else(|| SkipReason::Translation("no translator configured".to_string()))?;

        let title = translator
            .translate(&raw.title)
            .await
            .map_err(|e| SkipReason::Translation(e.to_string()))?;
        let body = translator
            .translate(&raw.body)
            .await
            .map_err(|e| SkipReason::Translation(e.to_string()))?;

        Ok(RawArticle { title, body, ..raw })
    }
}

// Parsed documents are not Send, so parsing stays in plain functions outside the futures.
fn extract_links<R: PageRules>(rules: &R, html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    rules.listing_links(&document, base_url)
}

fn extract_article<R: PageRules>(rules: &R, html: &str, page_url: &str) -> Result<RawArticle, SkipReason> {
    let document = Html::parse_document(html);
    rules.parse_article(&document, page_url)
}

/// Drop repeated links, keep page order, then flip to oldest first.
fn oldest_first(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect();
    unique.reverse();
    unique
}

#[async_trait]
impl<R: PageRules> Source for NewsSource<R> {
    type Candidate = String;
    type Item = Item;

    fn config(&self) -> &BotConfig {
        &self.config
    }

    async fn fetch_listing(&self, client: &Client) -> Result<Vec<String>, FetchError> {
        let html = fetch_text(client, &self.config.listing_url, &self.config.headers).await?;

        let links = oldest_first(extract_links(&self.rules, &html, &self.config.base_url));
        info!("Found {} article links on {}", links.len(), self.config.kind);
        Ok(links)
    }

    fn candidate_key(&self, candidate: &String) -> ItemKey {
        ItemKey(candidate.clone())
    }

    async fn extract_item(&self, client: &Client, url: String) -> Extraction {
        debug!("Fetching article page {}", url);
        let html = match fetch_text(client, &url, &self.config.headers).await {
            Ok(html) => html,
            Err(e) => return Extraction::Skip(e.into()),
        };

        let raw = match extract_article(&self.rules, &html, &url) {
            Ok(raw) => raw,
            Err(reason) => return Extraction::Skip(reason),
        };

        match self.translate(raw).await {
            Ok(article) => Extraction::Item(Item {
                key: ItemKey(url.clone()),
                title: article.title,
                body: article.body,
                image_url: Some(article.image_url),
                link: url,
            }),
            Err(reason) => Extraction::Skip(reason),
        }
    }

    fn format_message(&self, item: &Item) -> Message {
        Message {
            text: news_caption(item, &self.config.source_name, self.rules.body_limit()),
            photo_url: item.image_url.clone(),
            button: LinkButton::new(&self.config.target.button_label, &item.link),
        }
    }
}
