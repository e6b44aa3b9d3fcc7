//! HTTP client for upstream providers
//!
//! Every provider call goes through a client with a hard request timeout,
//! so one slow upstream cannot hold a cycle open.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Client configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 1,
            retry_delay_ms: 500,
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// Errors from upstream networking
#[derive(Debug, Error)]
pub enum NetError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed feed: {0}")]
    Xml(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Flashpoint/0.1 (+conflict signal monitor)",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create an HTTP client with the configured timeout
pub fn create_client(config: &FetchConfig) -> Result<Client, NetError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(5)))
        .user_agent(random_user_agent())
        .build()
        .map_err(|e| NetError::ClientBuild(e.to_string()))
}

/// GET a URL and return the body, retrying transient failures
pub async fn fetch_text(client: &Client, url: &str, config: &FetchConfig) -> Result<String, NetError> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url, config).await {
            Ok(body) => return Ok(body),
            Err(e) if attempt < config.max_retries && is_transient(&e) => {
                attempt += 1;
                debug!("Retrying {} (attempt {}): {}", url, attempt + 1, e);
                tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn fetch_once(client: &Client, url: &str, config: &FetchConfig) -> Result<String, NetError> {
    let response = client.get(url).send().await.map_err(|e| classify(e, config))?;

    let status = response.status();
    if !status.is_success() {
        return Err(NetError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response.text().await.map_err(|e| classify(e, config))
}

fn classify(e: reqwest::Error, config: &FetchConfig) -> NetError {
    if e.is_timeout() {
        NetError::Timeout(config.timeout_secs)
    } else {
        NetError::Request(e)
    }
}

fn is_transient(e: &NetError) -> bool {
    match e {
        NetError::Timeout(_) => true,
        NetError::Request(inner) => inner.is_connect() || inner.is_request(),
        NetError::Status { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}
