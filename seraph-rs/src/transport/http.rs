//! HTTP transport over `reqwest`.
//!
//! Uses `backoff` for exponential-backoff retry of idempotent requests when a
//! retry budget is configured. POST, and with it every batch commit, is sent
//! exactly once.

use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use reqwest::header::{ACCEPT, LOCATION};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SeraphError};
use crate::types::ClientConfig;

use super::{Method, RawResponse, Request, Transport};

/// [`Transport`] speaking JSON over HTTP to `{server}{endpoint}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    auth: Option<(String, Option<String>)>,
    retry_max_elapsed: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SeraphError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            auth: config
                .user
                .clone()
                .map(|user| (user, config.password.clone())),
            retry_max_elapsed: config.retry_max_elapsed_secs.map(Duration::from_secs),
        })
    }

    /// Override the retry budget for idempotent requests (`None` disables retries).
    pub fn with_retry_budget(mut self, max_elapsed: Option<Duration>) -> Self {
        self.retry_max_elapsed = max_elapsed;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URIs (e.g. a `Location` from an earlier response) pass through.
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    async fn send_once(&self, request: &Request) -> Result<RawResponse> {
        let url = self.url_for(&request.path);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .client
            .request(reqwest_method(request.method), &url)
            .header(ACCEPT, "application/json");

        if let Some((user, password)) = &self.auth {
            builder = builder.basic_auth(user, password.as_deref());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SeraphError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SeraphError::Transport(e.to_string()))?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else if (200..300).contains(&status) {
            Some(serde_json::from_slice(&bytes)?)
        } else {
            // Error pages from proxies are often HTML or plain text.
            Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).trim().to_string())
            }))
        };

        Ok(RawResponse {
            status,
            body,
            location,
        })
    }

    async fn send_with_retry(&self, request: &Request, max_elapsed: Duration) -> Result<RawResponse> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(50))
            .with_max_interval(Duration::from_secs(5))
            .with_max_elapsed_time(Some(max_elapsed))
            .build();

        backoff::future::retry(policy, || async {
            match self.send_once(request).await {
                Ok(response) if response.status == 503 => {
                    warn!(method = %request.method, path = %request.path, "service unavailable, retrying");
                    Err(backoff::Error::transient(SeraphError::service(
                        response.status,
                        response.body.as_ref(),
                    )))
                }
                Ok(response) => Ok(response),
                Err(err @ SeraphError::Transport(_)) => {
                    warn!(method = %request.method, path = %request.path, error = %err, "transport failure, retrying");
                    Err(backoff::Error::transient(err))
                }
                Err(err) => Err(backoff::Error::permanent(err)),
            }
        })
        .await
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse> {
        match self.retry_max_elapsed {
            Some(max_elapsed) if request.method.is_idempotent() => {
                self.send_with_retry(request, max_elapsed).await
            }
            _ => self.send_once(request).await,
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}
