//! HTTP Polling Source
//!
//! ## Overview
//!
//! Pulls the latest readings from a REST endpoint once per refresh tick.
//! This is the fallback path for dashboards that cannot hold a push
//! connection open: stateless, firewall-friendly and easy to debug.
//!
//! ## Response Shapes
//!
//! The endpoint may answer with a bare list of records or wrap it:
//!
//! ```json
//! [ { "deviceId": "pump-07", "timestamp": 1714564800000, "variables": { "temperature": 61.2 } } ]
//! ```
//! ```json
//! { "readings": [ { "seriesKey": "pump-07", "timestamp": "2024-05-01T12:00:00Z", "value": 61.2 } ] }
//! ```
//!
//! An empty body is an empty batch.
//!
//! ## Retries
//!
//! Transport errors, 5xx and 429 are retried with exponential backoff
//! (200 ms, 400 ms, 800 ms, ...). Any other 4xx fails the tick straight away;
//! retrying a bad token or a wrong path only delays the error.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use livetrend_feed::http::{HttpConfig, HttpPoller};
//! use livetrend_feed::BatchSource;
//!
//! # async fn example() -> Result<(), livetrend_feed::FeedError> {
//! let config = HttpConfig::new("https://api.example.com")
//!     .path("/api/v1/telemetry/latest")
//!     .bearer_token("your-api-token")
//!     .timeout_secs(10);
//!
//! let mut poller = HttpPoller::new(config)?;
//! let records = poller.fetch().await?;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine;
use livetrend_core::ingest::IncomingRecord;
use log::{debug, warn};
use serde::Deserialize;

use crate::{BatchSource, FeedError};

/// HTTP configuration
#[derive(Clone)]
pub struct HttpConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Path of the readings endpoint
    pub path: String,
    /// Request timeout
    pub timeout: Duration,
    /// Authentication method
    pub auth: AuthMethod,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// User agent string
    pub user_agent: String,
}

/// Authentication methods
#[derive(Clone)]
pub enum AuthMethod {
    /// No authentication
    None,
    /// Bearer token
    Bearer(String),
    /// Basic authentication
    Basic { username: String, password: String },
    /// API key in header
    ApiKey { header: String, value: String },
}

impl HttpConfig {
    /// Create new configuration with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: String::new(),
            timeout: Duration::from_secs(10),
            auth: AuthMethod::None,
            headers: HashMap::new(),
            max_retries: 3,
            user_agent: format!("livetrend/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the readings endpoint path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Bearer(token.into());
        self
    }

    /// Set basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Set API key authentication
    pub fn api_key(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth = AuthMethod::ApiKey {
            header: header.into(),
            value: value.into(),
        };
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set the retry count
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Full endpoint URL
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

/// Request counters for one poller
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollStats {
    /// Attempts made, retries included
    pub requests: u64,
    /// Polls that gave up
    pub failures: u64,
    /// Response bytes read
    pub bytes_received: u64,
    /// Response elements that were not records
    pub records_rejected: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedBody {
    List(Vec<serde_json::Value>),
    Wrapped { readings: Vec<serde_json::Value> },
}

/// Records decoded from one response
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Decoded {
    /// Records matching either wire shape
    pub records: Vec<IncomingRecord>,
    /// Elements that matched neither shape
    pub rejected: usize,
}

/// Batch source polling a REST endpoint with the lightweight ureq client
pub struct HttpPoller {
    config: HttpConfig,
    agent: ureq::Agent,
    url: String,
    stats: PollStats,
    undecodable: usize,
}

impl HttpPoller {
    /// Create new poller
    pub fn new(config: HttpConfig) -> Result<Self, FeedError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(FeedError::Config(
                "Base URL must start with http:// or https://".into(),
            ));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();
        let url = config.url();

        Ok(Self {
            config,
            agent,
            url,
            stats: PollStats::default(),
            undecodable: 0,
        })
    }

    /// Request counters
    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Build request with authentication and headers
    fn build_request(&self) -> ureq::Request {
        let mut request = self.agent.get(&self.url);

        match &self.config.auth {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                request = request.set("Authorization", &format!("Bearer {}", token));
            }
            AuthMethod::Basic { username, password } => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                request = request.set("Authorization", &format!("Basic {}", credentials));
            }
            AuthMethod::ApiKey { header, value } => {
                request = request.set(header, value);
            }
        }

        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request.set("Accept", "application/json")
    }

    /// One blocking attempt, off the runtime threads
    async fn attempt(&self) -> Result<String, FeedError> {
        let request = self.build_request();
        let joined = tokio::task::spawn_blocking(move || match request.call() {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| FeedError::Request(e.to_string())),
            Err(ureq::Error::Status(code, resp)) => Err(FeedError::Status {
                status: code,
                message: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(FeedError::Request(e.to_string())),
        })
        .await;

        joined.unwrap_or_else(|e| Err(FeedError::Task(e.to_string())))
    }

    /// Execute the GET with retry logic
    async fn execute_with_retry(&mut self) -> Result<String, FeedError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * (1 << attempt.min(10)));
                debug!("Retrying {} in {:?} (attempt {})", self.url, delay, attempt);
                tokio::time::sleep(delay).await;
            }

            self.stats.requests += 1;
            match self.attempt().await {
                Ok(text) => {
                    self.stats.bytes_received += text.len() as u64;
                    return Ok(text);
                }
                Err(e) if is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => {
                    self.stats.failures += 1;
                    return Err(e);
                }
            }
        }

        self.stats.failures += 1;
        Err(last_error.unwrap_or_else(|| FeedError::Request("Unknown error".into())))
    }
}

/// Transport errors, server errors and rate limits are worth another try
fn is_retryable(error: &FeedError) -> bool {
    match error {
        FeedError::Status { status, .. } => *status >= 500 || *status == 429,
        FeedError::Request(_) => true,
        _ => false,
    }
}

/// Decode a response body into records
///
/// Only a body that is not a list (bare or wrapped) is an error. Elements are
/// decoded one by one; those matching neither record shape are logged and
/// counted, the rest are kept.
pub fn decode_body(text: &str) -> Result<Decoded, FeedError> {
    if text.trim().is_empty() {
        return Ok(Decoded::default());
    }

    let elements = match serde_json::from_str(text).map_err(|e| FeedError::Decode(e.to_string()))? {
        FeedBody::List(elements) => elements,
        FeedBody::Wrapped { readings } => readings,
    };

    let mut decoded = Decoded {
        records: Vec::with_capacity(elements.len()),
        rejected: 0,
    };
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<IncomingRecord>(element) {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                warn!("Dropping record {} of response: {}", index, e);
                decoded.rejected += 1;
            }
        }
    }
    Ok(decoded)
}

#[async_trait::async_trait]
impl BatchSource for HttpPoller {
    async fn fetch(&mut self) -> Result<Vec<IncomingRecord>, FeedError> {
        let text = self.execute_with_retry().await?;
        let decoded = decode_body(&text).map_err(|e| {
            warn!("Undecodable response from {}: {}", self.url, e);
            e
        })?;

        self.stats.records_rejected += decoded.rejected as u64;
        self.undecodable += decoded.rejected;
        Ok(decoded.records)
    }

    fn take_rejected(&mut self) -> usize {
        std::mem::take(&mut self.undecodable)
    }

    fn name(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livetrend_core::ingest::RawSample;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serve the canned responses in order, one per connection
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        std::thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        (format!("http://{}", addr), hits)
    }

    #[test]
    fn test_config_builder() {
        let config = HttpConfig::new("https://api.example.com")
            .path("/api/v1/telemetry/latest")
            .bearer_token("test-token")
            .timeout_secs(60)
            .max_retries(1)
            .header("X-Custom", "value");

        assert_eq!(config.url(), "https://api.example.com/api/v1/telemetry/latest");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 1);
        assert!(config.headers.contains_key("X-Custom"));

        match config.auth {
            AuthMethod::Bearer(token) => assert_eq!(token, "test-token"),
            _ => panic!("Wrong auth method"),
        }
    }

    #[test]
    fn test_url_validation() {
        let result = HttpPoller::new(HttpConfig::new("not-a-url"));
        assert!(matches!(result, Err(FeedError::Config(_))));

        let result = HttpPoller::new(HttpConfig::new("https://valid.url"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_decode_shapes() {
        let list = decode_body(r#"[{"seriesKey": "d1", "timestamp": 1000, "value": 1.0}]"#).unwrap();
        assert_eq!(list.records, vec![RawSample::new("d1", 1_000u64, 1.0).into()]);
        assert_eq!(list.rejected, 0);

        let wrapped =
            decode_body(r#"{"readings": [{"seriesKey": "d1", "timestamp": 1000, "value": 1.0}]}"#)
                .unwrap();
        assert_eq!(wrapped, list);

        assert_eq!(decode_body("  ").unwrap(), Decoded::default());
        assert!(matches!(decode_body("{\"status\": \"ok\"}"), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_bad_records_do_not_spoil_the_body() {
        let decoded = decode_body(
            r#"[
                {"seriesKey": "d1", "timestamp": 1000, "value": 1.0},
                {"seriesKey": "d2", "timestamp": 1000, "value": null},
                {"seriesKey": "d3", "timestamp": -5, "value": 2.0},
                {"seriesKey": "d4", "timestamp": 1000.5, "value": 2.0},
                "garbage",
                {"deviceId": "m-01", "timestamp": 2000, "variables": {"temperature": 21.5, "status": "ok"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(decoded.rejected, 4);
        assert_eq!(decoded.records.len(), 2);
        assert_eq!(decoded.records[0], RawSample::new("d1", 1_000u64, 1.0).into());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let (base, hits) = serve(vec![(
            200,
            r#"[{"deviceId": "m-01", "timestamp": 5000, "variables": {"temperature": 21.5}},
                {"seriesKey": "d2", "timestamp": 5000, "value": null}]"#,
        )]);
        let mut poller = HttpPoller::new(HttpConfig::new(base).path("/latest")).unwrap();

        let records = poller.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(poller.stats().requests, 1);
        assert_eq!(poller.stats().records_rejected, 1);
        assert!(poller.stats().bytes_received > 0);

        assert_eq!(poller.take_rejected(), 1);
        assert_eq!(poller.take_rejected(), 0);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (base, hits) = serve(vec![(404, "missing"), (200, "[]")]);
        let mut poller = HttpPoller::new(HttpConfig::new(base).max_retries(3)).unwrap();

        match poller.fetch().await {
            Err(FeedError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "missing");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(poller.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (base, hits) = serve(vec![
            (503, "busy"),
            (200, r#"{"readings": [{"seriesKey": "d1", "timestamp": 1000, "value": 2.0}]}"#),
        ]);
        let mut poller = HttpPoller::new(HttpConfig::new(base).max_retries(2)).unwrap();

        let records = poller.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(poller.stats().requests, 2);
        assert_eq!(poller.stats().failures, 0);
    }
}
