// src/fetch/page.rs

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{Result, ScrapeError};

pub const FARSIDE_BTC_URL: &str = "https://farside.co.uk/btc/";

const PREVIEW_CHARS: usize = 500;

/// Where to fetch from and how to present ourselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub url: String,
    /// Sent on every request. `Accept-Encoding` is negotiated by the client
    /// and ignored here so bodies are decompressed transparently.
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let headers = [
            (
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            ),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
                 image/webp,image/apng,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Sec-Fetch-User", "?1"),
            ("Cache-Control", "max-age=0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            url: FARSIDE_BTC_URL.into(),
            headers,
            timeout_secs: 30,
        }
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| ScrapeError::Config(format!("header name {:?}: {}", k, e)))?;
        if name == ACCEPT_ENCODING {
            warn!("ignoring configured Accept-Encoding; the client negotiates compression");
            continue;
        }
        let value = HeaderValue::from_str(v)
            .map_err(|e| ScrapeError::Config(format!("header {:?} value: {}", k, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Build the HTTP client for one run: browser-like default headers, a
/// cookie jar and gzip/brotli/deflate decoding.
pub fn build_client(cfg: &FetchConfig) -> Result<Client> {
    Client::builder()
        .default_headers(header_map(&cfg.headers)?)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .map_err(|source| ScrapeError::Request {
            url: cfg.url.clone(),
            source,
        })
}

/// GET `url` once and return the decoded body. Anything but a 2xx is an error.
#[instrument(level = "info", skip(client))]
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage> {
    let parsed = Url::parse(url).map_err(|e| ScrapeError::Config(format!("url {:?}: {}", url, e)))?;

    info!("fetching page");
    let resp = client
        .get(parsed.clone())
        .send()
        .await
        .map_err(|source| ScrapeError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = resp.status();
    info!(%status, "response");
    for (k, v) in resp.headers() {
        debug!(header = %k, value = ?v, "response header");
    }

    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.text().await.map_err(|source| ScrapeError::Request {
        url: url.to_string(),
        source,
    })?;
    debug!(
        bytes = body.len(),
        preview = %body.chars().take(PREVIEW_CHARS).collect::<String>(),
        "body"
    );

    Ok(FetchedPage {
        url: parsed,
        status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_and_sends_configured_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/btc/"))
            .and(header("sec-fetch-mode", "navigate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = FetchConfig::default();
        let client = build_client(&cfg).unwrap();
        let page = fetch_page(&client, &format!("{}/btc/", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(page.body, "<table></table>");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("cf challenge"))
            .mount(&server)
            .await;

        let client = build_client(&FetchConfig::default()).unwrap();
        let err = fetch_page(&client, &server.uri()).await.unwrap_err();
        match err {
            ScrapeError::Status { status, .. } => assert_eq!(status, StatusCode::FORBIDDEN),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn bad_url_is_a_config_error() {
        let client = build_client(&FetchConfig::default()).unwrap();
        assert!(matches!(
            fetch_page(&client, "not a url").await,
            Err(ScrapeError::Config(_))
        ));
    }

    #[test]
    fn invalid_header_is_rejected() {
        let mut cfg = FetchConfig::default();
        cfg.headers.insert("Bad Header".into(), "x".into());
        assert!(matches!(build_client(&cfg), Err(ScrapeError::Config(_))));
    }

    #[test]
    fn accept_encoding_is_dropped() {
        let mut headers = BTreeMap::new();
        headers.insert("Accept-Encoding".to_string(), "br".to_string());
        headers.insert("Accept".to_string(), "text/html".to_string());
        let map = header_map(&headers).unwrap();
        assert!(map.get(ACCEPT_ENCODING).is_none());
        assert_eq!(map.len(), 1);
    }
}
