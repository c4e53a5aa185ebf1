use ::config::{Config as Layered, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ConfigError;
use crate::models::{SourceKind, CVE_DETAILS_LABEL, FULL_ARTICLE_LABEL};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Raw settings as read from the optional config file and the environment.
///
/// Field names match the lowercased environment variables, so
/// `TELEGRAM_CHAT_ID` lands in `telegram_chat_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub telegram_chat_id: Option<String>,
    pub telegram_token_cve: Option<String>,
    pub telegram_token_masr_news: Option<String>,
    pub telegram_token_real_madrid: Option<String>,
    pub nvd_api_key: Option<String>,
    pub database_url: Option<String>,
    pub telegram_api_url: Option<String>,
    pub translate_api_url: Option<String>,
    pub user_agent: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub sources: HashMap<String, SourceOverrides>,
}

/// Per-source values that may replace the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceOverrides {
    pub url: Option<String>,
    pub base_url: Option<String>,
    pub collection: Option<String>,
    pub source_name: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Settings {
    /// Layer the environment over an optional config file.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Layered::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    fn token_for(&self, kind: SourceKind) -> Option<&String> {
        match kind {
            SourceKind::Nvd => self.telegram_token_cve.as_ref(),
            SourceKind::GateAhram => self.telegram_token_masr_news.as_ref(),
            SourceKind::As | SourceKind::Marca | SourceKind::RealMadrid => {
                self.telegram_token_real_madrid.as_ref()
            }
        }
    }
}

/// Channel a bot posts into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub chat_id: String,
    pub bot_token: String,
    pub button_label: String,
}

/// Validated configuration for a single source run.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub kind: SourceKind,
    pub listing_url: String,
    pub base_url: String,
    pub headers: HashMap<String, String>,
    pub collection: String,
    pub source_name: String,
    pub target: DeliveryTarget,
    /// NVD API key; always present for `SourceKind::Nvd`.
    pub api_key: Option<String>,
    pub database_url: String,
    pub telegram_api_url: String,
    pub translate_api_url: String,
    pub user_agent: String,
    pub request_timeout_seconds: u64,
}

struct SourceDefaults {
    url: &'static str,
    base_url: &'static str,
    collection: &'static str,
    source_name: &'static str,
    accept: &'static str,
}

fn source_defaults(kind: SourceKind) -> SourceDefaults {
    match kind {
        SourceKind::Nvd => SourceDefaults {
            url: "https://services.nvd.nist.gov/rest/json/cves/2.0",
            base_url: "https://nvd.nist.gov",
            collection: "cve_ids",
            source_name: "NVD",
            accept: "application/json",
        },
        SourceKind::GateAhram => SourceDefaults {
            url: "https://gate.ahram.org.eg/UrgentNews.aspx",
            base_url: "https://gate.ahram.org.eg",
            collection: "masr_articles",
            source_name: "بوابة الأهرام",
            accept: "text/html",
        },
        SourceKind::As => SourceDefaults {
            url: "https://as.com/noticias/real-madrid/",
            base_url: "https://as.com",
            collection: "real_madrid_as_articles",
            source_name: "صحيفة اّس",
            accept: "text/html",
        },
        SourceKind::Marca => SourceDefaults {
            url: "https://www.marca.com/futbol/real-madrid.html",
            base_url: "https://www.marca.com",
            collection: "real_madrid_marca_articles",
            source_name: "صحيفة ماركا",
            accept: "text/html",
        },
        SourceKind::RealMadrid => SourceDefaults {
            url: "https://www.realmadrid.com/es-ES/noticias",
            base_url: "https://www.realmadrid.com",
            collection: "real_madrid_official_articles",
            source_name: "الموقع الرسمي لريال مدريد",
            accept: "text/html",
        },
    }
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BotConfig {
    /// Build the run configuration for `kind`, failing with every missing
    /// required variable at once.
    pub fn resolve(kind: SourceKind, settings: &Settings) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();

        let chat_id = present(settings.telegram_chat_id.as_ref());
        if chat_id.is_none() {
            missing.push("TELEGRAM_CHAT_ID");
        }

        let bot_token = present(settings.token_for(kind));
        if bot_token.is_none() {
            missing.push(kind.token_variable());
        }

        let database_url = present(settings.database_url.as_ref());
        if database_url.is_none() {
            missing.push("DATABASE_URL");
        }

        let api_key = present(settings.nvd_api_key.as_ref());
        if kind == SourceKind::Nvd && api_key.is_none() {
            missing.push("NVD_API_KEY");
        }

        let (Some(chat_id), Some(bot_token), Some(database_url), true) =
            (chat_id, bot_token, database_url, missing.is_empty())
        else {
            return Err(ConfigError::MissingFields { kind, fields: missing });
        };

        let defaults = source_defaults(kind);
        let overrides = settings.sources.get(kind.key()).cloned().unwrap_or_default();

        // Header names are case-insensitive; keep one spelling so overrides replace defaults.
        let mut headers = HashMap::from([("accept".to_string(), defaults.accept.to_string())]);
        headers.extend(
            overrides
                .headers
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value)),
        );

        let button_label = match kind {
            SourceKind::Nvd => CVE_DETAILS_LABEL,
            _ => FULL_ARTICLE_LABEL,
        };

        Ok(BotConfig {
            kind,
            listing_url: overrides.url.unwrap_or_else(|| defaults.url.to_string()),
            base_url: overrides.base_url.unwrap_or_else(|| defaults.base_url.to_string()),
            headers,
            collection: overrides
                .collection
                .unwrap_or_else(|| defaults.collection.to_string()),
            source_name: overrides
                .source_name
                .unwrap_or_else(|| defaults.source_name.to_string()),
            target: DeliveryTarget {
                chat_id,
                bot_token,
                button_label: button_label.to_string(),
            },
            api_key: if kind == SourceKind::Nvd { api_key } else { None },
            database_url,
            telegram_api_url: present(settings.telegram_api_url.as_ref())
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            translate_api_url: present(settings.translate_api_url.as_ref())
                .unwrap_or_else(|| DEFAULT_TRANSLATE_API_URL.to_string()),
            user_agent: present(settings.user_agent.as_ref())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            request_timeout_seconds: settings
                .request_timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        })
    }
}
