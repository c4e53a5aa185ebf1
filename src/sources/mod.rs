use async_trait::async_trait;
use reqwest::Client;

use crate::config::BotConfig;
use crate::error::{FetchError, SkipReason};
use crate::models::{Item, ItemKey};
use crate::telegram::Message;

mod diario_as;
mod gate_ahram;
mod marca;
mod news;
mod nvd;
mod real_madrid;

pub use diario_as::AsRules;
pub use gate_ahram::GateAhramRules;
pub use marca::MarcaRules;
pub use news::{NewsSource, PageRules, RawArticle};
pub use nvd::{listing_window, NvdSource};
pub use real_madrid::RealMadridRules;

/// Outcome of extracting one candidate.
#[derive(Debug)]
pub enum Extraction<T = Item> {
    Item(T),
    Skip(SkipReason),
}

impl<T> From<Result<T, SkipReason>> for Extraction<T> {
    fn from(result: Result<T, SkipReason>) -> Self {
        match result {
            Ok(item) => Extraction::Item(item),
            Err(reason) => Extraction::Skip(reason),
        }
    }
}

/// Per-source strategy driven by [`crate::pipeline::Pipeline`].
#[async_trait]
pub trait Source: Send + Sync {
    /// One entry of the listing, before any detail work.
    type Candidate: Send + Sync;

    /// What a successful extraction yields and the formatter consumes.
    type Item: Send;

    fn config(&self) -> &BotConfig;

    /// Candidates oldest first.
    async fn fetch_listing(&self, client: &Client) -> Result<Vec<Self::Candidate>, FetchError>;

    fn candidate_key(&self, candidate: &Self::Candidate) -> ItemKey;

    async fn extract_item(&self, client: &Client, candidate: Self::Candidate) -> Extraction<Self::Item>;

    fn format_message(&self, item: &Self::Item) -> Message;
}
