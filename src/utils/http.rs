use anyhow::Result;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;

pub fn create_client(user_agent: &str, timeout_seconds: u64) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?;

    Ok(client)
}

/// Attach configured headers to a request.
pub fn with_headers(mut request: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

/// Send a request once. Non-2xx statuses become `FetchError::Status`; nothing is retried.
pub async fn send_once(request: RequestBuilder, url: &str) -> Result<Response, FetchError> {
    let response = request.send().await.map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP error {}: {}", status, url);
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    debug!("HTTP {} from {}", status, url);
    Ok(response)
}

/// GET a page and return its body as text.
pub async fn fetch_text(
    client: &Client,
    url: &str,
    headers: &HashMap<String, String>,
) -> Result<String, FetchError> {
    let response = send_once(with_headers(client.get(url), headers), url).await?;
    response.text().await.map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_text_sends_headers_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("accept", "text/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client("news-bots-test", 5).unwrap();
        let headers = HashMap::from([("accept".to_string(), "text/html".to_string())]);
        let body = fetch_text(&client, &format!("{}/page", server.uri()), &headers)
            .await
            .unwrap();

        assert_eq!(body, "<p>hi</p>");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client("news-bots-test", 5).unwrap();
        let err = fetch_text(&client, &server.uri(), &HashMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
