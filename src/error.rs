use thiserror::Error;

use crate::models::SourceKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration for {kind}: {}", .fields.join(", "))]
    MissingFields {
        kind: SourceKind,
        fields: Vec<&'static str>,
    },
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Why an item was dropped before delivery. None of these stop the run.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("missing page element: {0}")]
    MissingElement(&'static str),
    #[error("missing record field: {0}")]
    MissingField(&'static str),
    #[error("base score {0:.1} below alert threshold")]
    BelowThreshold(f64),
    #[error("translation failed: {0}")]
    Translation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed_together() {
        let err = ConfigError::MissingFields {
            kind: SourceKind::Nvd,
            fields: vec!["TELEGRAM_TOKEN_CVE", "NVD_API_KEY"],
        };
        assert_eq!(
            err.to_string(),
            "missing required configuration for nvd: TELEGRAM_TOKEN_CVE, NVD_API_KEY"
        );
    }

    #[test]
    fn skip_reasons_read_well_in_logs() {
        assert_eq!(
            SkipReason::BelowThreshold(6.5).to_string(),
            "base score 6.5 below alert threshold"
        );
        let status = FetchError::Status {
            status: 404,
            url: "https://as.com/x".into(),
        };
        assert_eq!(SkipReason::from(status).to_string(), "HTTP 404 from https://as.com/x");
    }
}
