//! The dedup-and-dispatch loop shared by every source.
//!
//! Per candidate, in listing order: novelty check, extraction, formatting,
//! delivery, then persistence. A key is persisted only after its delivery
//! succeeded. Store failures abort the run; everything else about a single
//! item only skips that item.

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::BotConfig;
use crate::models::{SeenRecord, SourceKind};
use crate::sources::{
    AsRules, Extraction, GateAhramRules, MarcaRules, NewsSource, NvdSource, RealMadridRules, Source,
};
use crate::storage::Storage;
use crate::telegram::Notifier;
use crate::translate::{GoogleTranslator, Translator, TARGET_LANGUAGE};

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub listed: usize,
    pub already_seen: usize,
    pub skipped: usize,
    pub failed_deliveries: usize,
    pub delivered: usize,
    /// The listing could not be fetched, so nothing was processed.
    pub listing_failed: bool,
}

pub struct Pipeline<S: Source> {
    source: S,
    client: Client,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
}

impl<S: Source> Pipeline<S> {
    pub fn new(source: S, client: Client, storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            client,
            storage,
            notifier,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let config = self.source.config();
        let mut summary = RunSummary::default();

        let candidates = match self.source.fetch_listing(&self.client).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Failed to get listing for {}: {}", config.kind, e);
                summary.listing_failed = true;
                return Ok(summary);
            }
        };
        summary.listed = candidates.len();

        for candidate in candidates {
            let key = self.source.candidate_key(&candidate);

            let seen = self
                .storage
                .has_seen(&config.collection, &key)
                .await
                .context("Seen-record lookup failed")?;
            if seen {
                info!("{} in database - Skipping", key);
                summary.already_seen += 1;
                continue;
            }

            info!("{} not in database - Working", key);
            let item = match self.source.extract_item(&self.client, candidate).await {
                Extraction::Item(item) => item,
                Extraction::Skip(reason) => {
                    warn!("Skipping {}: {}", key, reason);
                    summary.skipped += 1;
                    continue;
                }
            };

            let message = self.source.format_message(&item);
            if let Err(e) = self.notifier.deliver(&config.target, &message).await {
                error!("Failed to deliver {}: {:#}", key, e);
                summary.failed_deliveries += 1;
                continue;
            }

            self.storage
                .mark_seen(&config.collection, &SeenRecord::new(key.clone(), &config.source_name))
                .await
                .context("Seen-record insert failed")?;
            info!("{} delivered and saved", key);
            summary.delivered += 1;
        }

        info!(
            "{} run finished: {} listed, {} already seen, {} skipped, {} failed, {} delivered",
            config.kind,
            summary.listed,
            summary.already_seen,
            summary.skipped,
            summary.failed_deliveries,
            summary.delivered
        );
        Ok(summary)
    }
}

/// Build the pipeline for `config.kind` and run it once.
pub async fn run_bot(
    config: BotConfig,
    client: Client,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
) -> Result<RunSummary> {
    match config.kind {
        SourceKind::Nvd => {
            Pipeline::new(NvdSource::new(config), client, storage, notifier)
                .run()
                .await
        }
        SourceKind::GateAhram => {
            Pipeline::new(NewsSource::new(config, GateAhramRules), client, storage, notifier)
                .run()
                .await
        }
        SourceKind::As => {
            let translator = google_translator(&config, &client);
            let source = NewsSource::new(config, AsRules).with_translator(translator);
            Pipeline::new(source, client, storage, notifier).run().await
        }
        SourceKind::Marca => {
            let translator = google_translator(&config, &client);
            let source = NewsSource::new(config, MarcaRules).with_translator(translator);
            Pipeline::new(source, client, storage, notifier).run().await
        }
        SourceKind::RealMadrid => {
            Pipeline::new(NewsSource::new(config, RealMadridRules), client, storage, notifier)
                .run()
                .await
        }
    }
}

fn google_translator(config: &BotConfig, client: &Client) -> Arc<dyn Translator> {
    Arc::new(GoogleTranslator::new(
        client.clone(),
        &config.translate_api_url,
        TARGET_LANGUAGE,
    ))
}
