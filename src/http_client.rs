use crate::models::FetchError;
use chrono::Utc;
use rand::Rng;
use reqwest::{Client, ClientBuilder, Response};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for the wiki HTTP client
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: usize,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub user_agent: String,
    pub enable_cookies: bool,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_retries: 3,
            initial_retry_delay_ms: 1000,
            max_retry_delay_ms: 8000,
            user_agent: "Mozilla/5.0 (compatible; DokkanScraper/2.0)".to_string(),
            enable_cookies: true,
            enable_gzip: true,
        }
    }
}

/// HTTP client with retries and a record of pages that could not be fetched
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    errors: Mutex<Vec<FetchError>>,
}

impl HttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            reqwest::header::CACHE_CONTROL,
            reqwest::header::HeaderValue::from_static("no-cache"),
        );

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .cookie_store(config.enable_cookies)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config,
            errors: Mutex::new(Vec::new()),
        })
    }

    /// Calculate retry delay with exponential backoff and jitter
    fn calculate_retry_delay(&self, attempt: usize) -> Duration {
        let base_delay = self.config.initial_retry_delay_ms;
        let max_delay = self.config.max_retry_delay_ms;

        let delay_ms = base_delay
            .saturating_mul(2u64.saturating_pow(attempt as u32))
            .min(max_delay);

        // ±25% so parallel workers don't retry in lockstep
        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(0.75..=1.25);
        Duration::from_millis((delay_ms as f64 * jitter) as u64)
    }

    fn is_retryable_status(status: reqwest::StatusCode) -> bool {
        matches!(
            status.as_u16(),
            // Rate limiting
            429 |
            // Server errors
            500 | 502 | 503 | 504 |
            // CDN edge errors
            520 | 521 | 522 | 523 | 524
        )
    }

    /// GET with retries on network errors and retryable statuses
    pub async fn get_with_retry(&self, url: &str) -> Result<Response, reqwest::Error> {
        let mut attempt = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if Self::is_retryable_status(status) && attempt < self.config.max_retries {
                        log::warn!(
                            "Received retryable status {} for {}, attempt {}/{}",
                            status,
                            url,
                            attempt + 1,
                            self.config.max_retries + 1
                        );
                    } else {
                        return response.error_for_status();
                    }
                }
                Err(e) => {
                    let should_retry = e.is_timeout()
                        || e.is_connect()
                        || e.is_request()
                        || e.status().map(Self::is_retryable_status).unwrap_or(false);

                    if !should_retry || attempt >= self.config.max_retries {
                        return Err(e);
                    }
                    log::warn!(
                        "Request failed for {}, attempt {}/{}: {}",
                        url,
                        attempt + 1,
                        self.config.max_retries + 1,
                        e
                    );
                }
            }

            sleep(self.calculate_retry_delay(attempt)).await;
            attempt += 1;
        }
    }

    pub async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.get_with_retry(url).await?;
        response.text().await
    }

    /// Fetch a page body, or `None` once retries are exhausted.
    ///
    /// Failures are logged and kept for [`HttpClient::take_errors`].
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        match self.get_text(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                log::error!("Giving up on {}: {}", url, e);
                self.record_error(url, &e.to_string());
                None
            }
        }
    }

    fn record_error(&self, url: &str, error: &str) {
        let entry = FetchError {
            url: url.to_string(),
            error: error.to_string(),
            timestamp: Utc::now(),
            retry_attempt: self.config.max_retries,
        };
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(entry);
        }
    }

    /// Drain the failures recorded so far.
    pub fn take_errors(&self) -> Vec<FetchError> {
        self.errors
            .lock()
            .map(|mut errors| std::mem::take(&mut *errors))
            .unwrap_or_default()
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
