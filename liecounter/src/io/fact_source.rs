//! Fact source abstraction and the Google Fact Check Tools client.
//!
//! The [`FactSource`] trait decouples run orchestration from the HTTP backend.
//! Tests use scripted sources that return predetermined matches or failures
//! without touching the network.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, instrument, warn};

use crate::error::FactSourceError;
use crate::fact_check::{ClaimMatch, SearchResponse};
use crate::io::config::FactSourceConfig;

/// Error bodies are cut to this many characters before being kept.
const ERROR_BODY_LIMIT: usize = 512;

/// Parameters for one fact-source query.
#[derive(Clone)]
pub struct FactQuery {
    pub endpoint: String,
    pub query: String,
    pub language_code: String,
    pub max_age_days: u32,
    pub page_size: u32,
    pub api_key: String,
    pub timeout: Duration,
}

impl FactQuery {
    pub fn from_config(cfg: &FactSourceConfig, api_key: String) -> Self {
        Self {
            endpoint: cfg.endpoint.clone(),
            query: cfg.query.clone(),
            language_code: cfg.language_code.clone(),
            max_age_days: cfg.max_age_days(),
            page_size: cfg.page_size,
            api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

impl std::fmt::Debug for FactQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactQuery")
            .field("endpoint", &self.endpoint)
            .field("query", &self.query)
            .field("language_code", &self.language_code)
            .field("max_age_days", &self.max_age_days)
            .field("page_size", &self.page_size)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Abstraction over fact-check backends.
pub trait FactSource {
    /// Issue one query. An empty vec means the source answered with no matches.
    fn search(&self, query: &FactQuery) -> Result<Vec<ClaimMatch>, FactSourceError>;
}

/// Blocking client for `factchecktools.googleapis.com/v1alpha1/claims:search`.
pub struct GoogleFactCheck {
    client: Client,
}

impl GoogleFactCheck {
    pub fn new() -> Result<Self, FactSourceError> {
        let client = Client::builder()
            .user_agent(concat!("liecounter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FactSourceError::Network(err.without_url()))?;
        Ok(Self { client })
    }
}

impl FactSource for GoogleFactCheck {
    #[instrument(skip_all, fields(query = %query.query, max_age_days = query.max_age_days))]
    fn search(&self, query: &FactQuery) -> Result<Vec<ClaimMatch>, FactSourceError> {
        let max_age_days = query.max_age_days.to_string();
        let page_size = query.page_size.to_string();
        let params = [
            ("query", query.query.as_str()),
            ("languageCode", query.language_code.as_str()),
            ("maxAgeDays", max_age_days.as_str()),
            ("pageSize", page_size.as_str()),
            ("key", query.api_key.as_str()),
        ];

        debug!(endpoint = %query.endpoint, "sending fact source request");
        let response = self
            .client
            .get(&query.endpoint)
            .query(&params)
            .timeout(query.timeout)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().map_err(transport_error)?;
        if !status.is_success() {
            warn!(%status, "fact source request rejected");
            return Err(status_error(status, &body));
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(FactSourceError::Malformed)?;
        debug!(matches = parsed.claims.len(), "fact source responded");
        Ok(parsed.claims)
    }
}

/// Read the API key from `env_name`, treating an empty value as absent.
pub fn api_key_from_env(env_name: &str) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Strip the URL (it carries the API key) and split timeouts from other failures.
fn transport_error(err: reqwest::Error) -> FactSourceError {
    let err = err.without_url();
    if err.is_timeout() {
        FactSourceError::Timeout(err)
    } else {
        FactSourceError::Network(err)
    }
}

fn status_error(status: StatusCode, body: &str) -> FactSourceError {
    let body: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
    let quota_hint = body.contains("rateLimitExceeded") || body.contains("quotaExceeded");
    match status {
        StatusCode::TOO_MANY_REQUESTS => FactSourceError::Quota { status, body },
        StatusCode::FORBIDDEN if quota_hint => FactSourceError::Quota { status, body },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FactSourceError::Auth { status, body },
        _ => FactSourceError::Status { status, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve a single canned HTTP response; the handle yields the request head.
    fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).expect("read");
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).expect("write");
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}/v1alpha1/claims:search"), handle)
    }

    /// Accept one connection, read the request head, then stay silent for `stall`.
    fn serve_stalled(stall: Duration) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            thread::sleep(stall);
        });
        (format!("http://{addr}/v1alpha1/claims:search"), handle)
    }

    fn local_client() -> GoogleFactCheck {
        let client = Client::builder().no_proxy().build().expect("client");
        GoogleFactCheck { client }
    }

    fn query_for(endpoint: String) -> FactQuery {
        let mut query = FactQuery::from_config(&FactSourceConfig::default(), "secret".to_string());
        query.endpoint = endpoint;
        query.timeout = Duration::from_secs(5);
        query
    }

    #[test]
    fn parses_claims_and_sends_expected_parameters() {
        let body = r#"{"claims":[{"text":"c","claimReview":[{"textualRating":"False"}]}]}"#;
        let (endpoint, server) = serve_once("200 OK", body);
        let client = local_client();

        let claims = client.search(&query_for(endpoint)).expect("search");
        let request = server.join().expect("server");

        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].text.as_deref(), Some("c"));
        let request_line = request.lines().next().expect("request line");
        assert!(request_line.starts_with("GET /v1alpha1/claims:search?"));
        assert!(request_line.contains("query=Donald+Trump"));
        assert!(request_line.contains("languageCode=en"));
        assert!(request_line.contains("maxAgeDays=1"));
        assert!(request_line.contains("key=secret"));
    }

    #[test]
    fn empty_body_object_is_no_matches() {
        let (endpoint, server) = serve_once("200 OK", "{}");
        let client = local_client();

        let claims = client.search(&query_for(endpoint)).expect("search");
        server.join().expect("server");

        assert!(claims.is_empty());
    }

    #[test]
    fn unauthorized_maps_to_auth_error() {
        let (endpoint, server) =
            serve_once("401 Unauthorized", r#"{"error":{"status":"UNAUTHENTICATED"}}"#);
        let client = local_client();

        let err = client.search(&query_for(endpoint)).expect_err("auth error");
        server.join().expect("server");

        assert!(matches!(
            err,
            FactSourceError::Auth { status: StatusCode::UNAUTHORIZED, .. }
        ));
    }

    #[test]
    fn forbidden_maps_to_auth_error() {
        let (endpoint, server) =
            serve_once("403 Forbidden", r#"{"error":{"status":"PERMISSION_DENIED"}}"#);
        let client = local_client();

        let err = client.search(&query_for(endpoint)).expect_err("auth error");
        server.join().expect("server");

        assert!(matches!(err, FactSourceError::Auth { .. }));
    }

    #[test]
    fn rate_limit_maps_to_quota_error() {
        let (endpoint, server) = serve_once("429 Too Many Requests", "{}");
        let client = local_client();

        let err = client.search(&query_for(endpoint)).expect_err("quota error");
        server.join().expect("server");

        assert!(matches!(err, FactSourceError::Quota { .. }));
    }

    #[test]
    fn stalled_server_is_timeout_error() {
        let (endpoint, server) = serve_stalled(Duration::from_secs(3));
        let client = local_client();
        let mut query = query_for(endpoint);
        query.timeout = Duration::from_secs(1);

        let err = client.search(&query).expect_err("timeout");
        server.join().expect("server");

        assert!(matches!(err, FactSourceError::Timeout(_)));
    }

    #[test]
    fn garbage_body_is_malformed() {
        let (endpoint, server) = serve_once("200 OK", "<html>oops</html>");
        let client = local_client();

        let err = client.search(&query_for(endpoint)).expect_err("malformed");
        server.join().expect("server");

        assert!(matches!(err, FactSourceError::Malformed(_)));
    }

    #[test]
    fn refused_connection_is_network_error_without_key() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let client = local_client();

        let err = client
            .search(&query_for(format!("http://{addr}/claims:search")))
            .expect_err("network error");

        assert!(matches!(err, FactSourceError::Network(_)));
        let rendered = format!("{:?}", anyhow::Error::from(err));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn status_error_prefers_quota_hint_on_forbidden() {
        let err = status_error(
            StatusCode::FORBIDDEN,
            r#"{"error":{"errors":[{"reason":"rateLimitExceeded"}]}}"#,
        );
        assert!(matches!(err, FactSourceError::Quota { .. }));
    }

    #[test]
    fn status_error_truncates_body() {
        let body = "x".repeat(2_000);
        let FactSourceError::Status { body, .. } = status_error(StatusCode::BAD_GATEWAY, &body)
        else {
            panic!("expected status error");
        };
        assert_eq!(body.len(), ERROR_BODY_LIMIT);
    }

    #[test]
    fn client_builds_with_default_settings() {
        assert!(GoogleFactCheck::new().is_ok());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let query = query_for("http://localhost".to_string());
        assert!(!format!("{query:?}").contains("secret"));
    }
}
