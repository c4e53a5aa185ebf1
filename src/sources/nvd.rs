use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::error::{FetchError, SkipReason};
use crate::formatter::cve_message;
use crate::models::{CveAlert, Item, ItemKey, Severity};
use crate::parsers::collapse_blank_lines;
use crate::parsers::cvss::{generate_report, meets_threshold, SeverityTier};
use crate::sources::{Extraction, Source};
use crate::telegram::{LinkButton, Message};
use crate::utils::http::{send_once, with_headers};

const CVE_DETAILS_URL: &str = "https://www.cvedetails.com/cve/";
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Default, Deserialize)]
struct NvdResponse {
    #[serde(default)]
    vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Default, Deserialize)]
struct Vulnerability {
    #[serde(default)]
    cve: CveRecord,
}

/// One CVE as returned by the NVD 2.0 API, reduced to the fields the alert uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CveRecord {
    pub id: Option<String>,
    pub published: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<LangString>,
    #[serde(default)]
    pub weaknesses: Vec<Weakness>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LangString {
    pub lang: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Weakness {
    #[serde(default)]
    pub description: Vec<LangString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reference {
    pub url: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metrics {
    #[serde(rename = "cvssMetricV40", default)]
    pub v40: Vec<MetricEntry>,
    #[serde(rename = "cvssMetricV31", default)]
    pub v31: Vec<MetricEntry>,
    #[serde(rename = "cvssMetricV30", default)]
    pub v30: Vec<MetricEntry>,
    #[serde(rename = "cvssMetricV2", default)]
    pub v2: Vec<MetricEntry>,
}

impl Metrics {
    /// Newest CVSS version available, first entry.
    fn preferred(&self) -> Option<&CvssData> {
        [&self.v40, &self.v31, &self.v30, &self.v2]
            .into_iter()
            .find_map(|entries| entries.first())
            .map(|entry| &entry.cvss_data)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricEntry {
    #[serde(default)]
    pub cvss_data: CvssData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvssData {
    pub base_score: Option<f64>,
    pub vector_string: Option<String>,
}

/// Published-date window covering the whole of `date`.
pub fn listing_window(date: NaiveDate) -> (String, String) {
    (
        date.format("%Y-%m-%dT00:00:00.000").to_string(),
        date.format("%Y-%m-%dT23:59:59.999").to_string(),
    )
}

/// Records with an id, in API order. Records without one are dropped here.
fn parse_listing(body: &str, url: &str) -> Result<Vec<CveRecord>, FetchError> {
    let response: NvdResponse = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let total = response.vulnerabilities.len();
    let records: Vec<CveRecord> = response
        .vulnerabilities
        .into_iter()
        .map(|vulnerability| vulnerability.cve)
        .filter(|cve| cve.id.as_deref().is_some_and(|id| !id.trim().is_empty()))
        .collect();

    if records.len() < total {
        warn!("{} CVE records without an id - Skipping", total - records.len());
    }

    Ok(records)
}

fn english_or_first(entries: &[LangString]) -> Option<&LangString> {
    entries
        .iter()
        .find(|entry| entry.lang.as_deref() == Some("en"))
        .or_else(|| entries.first())
}

/// Apply the alert rules to one record.
fn evaluate(record: CveRecord) -> Result<CveAlert, SkipReason> {
    let id = record.id.clone().ok_or(SkipReason::MissingField("id"))?;

    let cvss = record
        .metrics
        .preferred()
        .ok_or(SkipReason::MissingField("metrics"))?;
    let base_score = cvss.base_score.ok_or(SkipReason::MissingField("baseScore"))?;
    if !meets_threshold(Some(base_score)) {
        return Err(SkipReason::BelowThreshold(base_score));
    }

    if record.descriptions.is_empty() {
        return Err(SkipReason::MissingField("descriptions"));
    }
    if record.weaknesses.is_empty() {
        return Err(SkipReason::MissingField("weaknesses"));
    }
    if record.references.is_empty() {
        return Err(SkipReason::MissingField("references"));
    }

    let description = english_or_first(&record.descriptions)
        .map(|entry| collapse_blank_lines(&entry.value))
        .ok_or(SkipReason::MissingField("descriptions"))?;
    let weakness = record.weaknesses[0]
        .description
        .first()
        .map(|entry| entry.value.clone())
        .ok_or(SkipReason::MissingField("weaknesses"))?;
    let published = record
        .published
        .as_deref()
        .and_then(|raw| NaiveDateTime::parse_from_str(raw, PUBLISHED_FORMAT).ok())
        .ok_or(SkipReason::MissingField("published"))?;

    let report = generate_report(cvss.vector_string.as_deref().unwrap_or_default());

    Ok(CveAlert {
        item: Item {
            key: ItemKey(id.clone()),
            link: format!("{}{}", CVE_DETAILS_URL, id),
            title: id,
            body: description,
            image_url: None,
        },
        severity: Severity {
            base_score,
            tier: SeverityTier::from_score(base_score),
            weakness,
            report,
            published,
        },
    })
}

pub struct NvdSource {
    config: BotConfig,
}

impl NvdSource {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Source for NvdSource {
    type Candidate = CveRecord;
    type Item = CveAlert;

    fn config(&self) -> &BotConfig {
        &self.config
    }

    async fn fetch_listing(&self, client: &Client) -> Result<Vec<CveRecord>, FetchError> {
        let url = &self.config.listing_url;
        let (start, end) = listing_window(Local::now().date_naive());

        let mut headers = self.config.headers.clone();
        if let Some(key) = &self.config.api_key {
            headers.insert("apiKey".to_string(), key.clone());
        }

        let request = with_headers(
            client
                .get(url)
                .query(&[("pubStartDate", start.as_str()), ("pubEndDate", end.as_str())]),
            &headers,
        );
        let body = send_once(request, url)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let records = parse_listing(&body, url)?;
        info!("CVEs Count: {} published {} .. {}", records.len(), start, end);
        Ok(records)
    }

    fn candidate_key(&self, candidate: &CveRecord) -> ItemKey {
        ItemKey(candidate.id.clone().unwrap_or_default())
    }

    async fn extract_item(&self, _client: &Client, candidate: CveRecord) -> Extraction<CveAlert> {
        evaluate(candidate).into()
    }

    fn format_message(&self, alert: &CveAlert) -> Message {
        Message {
            text: cve_message(alert),
            photo_url: None,
            button: LinkButton::new(&self.config.target.button_label, &alert.item.link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::cvss::{AttackVector, ExploitMaturity};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> CveRecord {
        serde_json::from_value(value).unwrap()
    }

    fn complete(score: f64) -> serde_json::Value {
        json!({
            "id": "CVE-2024-0001",
            "published": "2024-06-01T08:15:10.123",
            "descriptions": [
                { "lang": "es", "value": "Descripcion" },
                { "lang": "en", "value": "Heap overflow.\n\n\n\nRemote code execution." }
            ],
            "weaknesses": [{ "description": [{ "lang": "en", "value": "CWE-122" }] }],
            "references": [{ "url": "https://vendor/advisory", "source": "vendor" }],
            "metrics": {
                "cvssMetricV31": [{ "cvssData": { "baseScore": 5.0, "vectorString": "CVSS:3.1/AV:L" } }],
                "cvssMetricV40": [{ "cvssData": { "baseScore": score, "vectorString": "CVSS:4.0/AV:N/AC:L/PR:N/E:A/VC:H/VI:H/VA:H" } }]
            }
        })
    }

    #[test]
    fn window_covers_the_whole_day() {
        let (start, end) = listing_window(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(start, "2024-06-01T00:00:00.000");
        assert_eq!(end, "2024-06-01T23:59:59.999");
    }

    #[test]
    fn complete_record_becomes_item() {
        let CveAlert { item, severity } = evaluate(record(complete(9.8))).unwrap();
        assert_eq!(item.key, ItemKey::from("CVE-2024-0001"));
        assert_eq!(item.link, "https://www.cvedetails.com/cve/CVE-2024-0001");
        assert_eq!(item.body, "Heap overflow.\n\nRemote code execution.");

        assert_eq!(severity.base_score, 9.8);
        assert_eq!(severity.tier, SeverityTier::Critical);
        assert_eq!(severity.weakness, "CWE-122");
        assert_eq!(severity.report.attack_vector, AttackVector::Network);
        assert_eq!(severity.report.exploit_state, ExploitMaturity::Attacked);
    }

    #[test]
    fn threshold_score_is_kept_and_below_is_rejected() {
        assert!(evaluate(record(complete(7.0))).is_ok());
        assert!(matches!(
            evaluate(record(complete(6.9))),
            Err(SkipReason::BelowThreshold(score)) if score == 6.9
        ));
    }

    #[test]
    fn missing_metrics_or_score_is_rejected() {
        let mut value = complete(9.0);
        value["metrics"] = json!({});
        assert!(matches!(evaluate(record(value)), Err(SkipReason::MissingField("metrics"))));

        let mut value = complete(9.0);
        value["metrics"] = json!({ "cvssMetricV31": [{ "cvssData": { "vectorString": "AV:N" } }] });
        assert!(matches!(evaluate(record(value)), Err(SkipReason::MissingField("baseScore"))));
    }

    #[test]
    fn older_metric_versions_are_used_when_newer_are_absent() {
        let mut value = complete(9.0);
        value["metrics"] = json!({ "cvssMetricV2": [{ "cvssData": { "baseScore": 7.2, "vectorString": "AV:N/AC:L" } }] });
        let severity = evaluate(record(value)).unwrap().severity;
        assert_eq!(severity.base_score, 7.2);
        assert_eq!(severity.tier, SeverityTier::High);
    }

    #[test]
    fn absent_text_fields_reject_the_record() {
        for field in ["descriptions", "weaknesses", "references"] {
            let mut value = complete(9.0);
            value.as_object_mut().unwrap().remove(field);
            match evaluate(record(value)) {
                Err(SkipReason::MissingField(name)) => assert_eq!(name, field),
                other => panic!("expected {field} to be required, got {other:?}"),
            }
        }
    }

    #[test]
    fn listing_drops_records_without_id() {
        let body = json!({
            "vulnerabilities": [
                { "cve": { "id": "CVE-1" } },
                { "cve": { "descriptions": [] } },
                { "cve": { "id": "" } },
                { "cve": { "id": "CVE-2" } }
            ]
        })
        .to_string();

        let records = parse_listing(&body, "https://nvd").unwrap();
        let ids: Vec<_> = records.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["CVE-1", "CVE-2"]);
    }

    #[test]
    fn undecodable_listing_is_a_fetch_error() {
        assert!(matches!(
            parse_listing("<html>maintenance</html>", "https://nvd"),
            Err(FetchError::Decode { .. })
        ));
    }

    #[test]
    fn alert_message_is_text_only_with_details_button() {
        let settings = crate::config::Settings {
            telegram_chat_id: Some("-1".into()),
            telegram_token_cve: Some("token".into()),
            nvd_api_key: Some("key".into()),
            database_url: Some(":memory:".into()),
            ..Default::default()
        };
        let source = NvdSource::new(BotConfig::resolve(crate::models::SourceKind::Nvd, &settings).unwrap());
        let alert = evaluate(record(complete(9.8))).unwrap();

        let message = source.format_message(&alert);
        assert!(message.text.starts_with("<b>CRITICAL ALERT - <code>CVE-2024-0001</code>"));
        assert_eq!(message.photo_url, None);
        assert_eq!(message.button.url, "https://www.cvedetails.com/cve/CVE-2024-0001");
    }
}
