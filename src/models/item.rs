use chrono::NaiveDateTime;
use std::fmt;

use crate::parsers::cvss::{CvssReport, SeverityTier};

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey(pub String);

impl ItemKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        ItemKey(value.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(value: String) -> Self {
        ItemKey(value)
    }
}

/// Scoring block attached to vulnerability items.
#[derive(Debug, Clone, PartialEq)]
pub struct Severity {
    pub base_score: f64,
    pub tier: SeverityTier,
    pub weakness: String,
    pub report: CvssReport,
    pub published: NaiveDateTime,
}

/// One piece of content ready to be formatted. Only its key is ever stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    /// Canonical page behind the message's link button.
    pub link: String,
}

/// A vulnerability that passed the alert rules, with its scoring block.
#[derive(Debug, Clone, PartialEq)]
pub struct CveAlert {
    pub item: Item,
    pub severity: Severity,
}

/// Marker proving a key was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRecord {
    pub unique_key: ItemKey,
    pub source: String,
}

impl SeenRecord {
    pub fn new(unique_key: ItemKey, source: impl Into<String>) -> Self {
        Self {
            unique_key,
            source: source.into(),
        }
    }
}
