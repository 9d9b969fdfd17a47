use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DOKKAN_BASE_URL: &str = "https://dbz-dokkanbattle.fandom.com";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScraperConfig {
    /// Wiki root that category and character links are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Category listings to crawl, in order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Maximum number of retry attempts for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial retry delay in milliseconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,

    /// Character pages fetched per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum in-flight page fetches
    #[serde(default = "default_concurrent_limit")]
    pub concurrent_limit: usize,

    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Pause between batches in milliseconds
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Where scraped JSON snapshots are written and imported from
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String { DOKKAN_BASE_URL.to_string() }
fn default_max_retries() -> usize { 3 }
fn default_retry_delay() -> u64 { 1000 }
fn default_max_retry_delay() -> u64 { 8000 }
fn default_batch_size() -> usize { 10 }
fn default_concurrent_limit() -> usize { 5 }
fn default_timeout() -> u64 { 15 }
fn default_batch_delay() -> u64 { 500 }
fn default_user_agent() -> String { "Mozilla/5.0 (compatible; DokkanScraper/2.0)".to_string() }
fn default_database_path() -> String { "dokkan.db".to_string() }
fn default_data_dir() -> String { "data".to_string() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3000 }

/// Category listings of the wiki; the UR listing is paginated.
pub fn default_categories() -> Vec<String> {
    [
        "N",
        "R",
        "SR",
        "SSR",
        "UR",
        "UR?from=Evil+Pride+Frieza+(Final+Form)+(Angel)",
        "UR?from=Next-Level+Strike+Super+Saiyan+God+SS+Goku",
        "UR?from=Training+and+Refreshment+Goku",
        "LR",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            categories: default_categories(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            max_retry_delay_ms: default_max_retry_delay(),
            batch_size: default_batch_size(),
            concurrent_limit: default_concurrent_limit(),
            request_timeout_secs: default_timeout(),
            batch_delay_ms: default_batch_delay(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, then apply environment
    /// overrides. A missing or invalid file falls back to defaults.
    pub fn load() -> Self {
        let mut cfg = Self::load_file(Path::new("config.toml"));
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg
    }

    pub fn load_file(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path)
                .map_err(crate::error::ScrapeError::from)
                .and_then(|content| Self::parse(&content))
            {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn parse(content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str::<Config>(content)?)
    }

    /// Apply `MAX_RETRIES`-style overrides from `lookup`.
    ///
    /// `REQUEST_TIMEOUT` is given in milliseconds. Unparsable values are
    /// logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("Ignoring invalid {}={:?}", key, value);
                    None
                }
            }
        }

        if let Some(v) = parsed("MAX_RETRIES", lookup("MAX_RETRIES")) {
            self.scraper.max_retries = v;
        }
        if let Some(v) = parsed("RETRY_DELAY", lookup("RETRY_DELAY")) {
            self.scraper.retry_delay_ms = v;
        }
        if let Some(v) = parsed::<usize>("BATCH_SIZE", lookup("BATCH_SIZE")) {
            self.scraper.batch_size = v.max(1);
        }
        if let Some(v) = parsed::<usize>("CONCURRENT_LIMIT", lookup("CONCURRENT_LIMIT")) {
            self.scraper.concurrent_limit = v.max(1);
        }
        if let Some(ms) = parsed::<u64>("REQUEST_TIMEOUT", lookup("REQUEST_TIMEOUT")) {
            self.scraper.request_timeout_secs = ms.div_ceil(1000).max(1);
        }
        if let Some(v) = lookup("USER_AGENT").filter(|v| !v.trim().is_empty()) {
            self.scraper.user_agent = v;
        }
        if let Some(v) = lookup("DB_PATH").filter(|v| !v.trim().is_empty()) {
            self.storage.database_path = v;
        }
        if let Some(v) = lookup("DATA_DIR").filter(|v| !v.trim().is_empty()) {
            self.storage.data_dir = v;
        }
        if let Some(v) = parsed("PORT", lookup("PORT")) {
            self.server.port = v;
        }
    }
}

impl ScraperConfig {
    /// HTTP client settings derived from this configuration
    pub fn http_client_config(&self) -> crate::http_client::HttpClientConfig {
        use std::time::Duration;

        crate::http_client::HttpClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_retries: self.max_retries,
            initial_retry_delay_ms: self.retry_delay_ms,
            max_retry_delay_ms: self.max_retry_delay_ms,
            user_agent: self.user_agent.clone(),
            enable_cookies: true,
            enable_gzip: true,
        }
    }

    /// URL of a category listing page.
    pub fn category_url(&self, category: &str) -> String {
        format!("{}/wiki/Category:{}", self.base_url.trim_end_matches('/'), category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.scraper.base_url, DOKKAN_BASE_URL);
        assert_eq!(cfg.scraper.max_retries, 3);
        assert_eq!(cfg.scraper.batch_size, 10);
        assert_eq!(cfg.scraper.concurrent_limit, 5);
        assert_eq!(cfg.scraper.categories.len(), 9);
        assert_eq!(cfg.scraper.categories.last().map(String::as_str), Some("LR"));
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = Config::parse("[scraper]\nbatch_size = 4\n\n[server]\nport = 8080\n").unwrap();
        assert_eq!(cfg.scraper.batch_size, 4);
        assert_eq!(cfg.scraper.max_retries, 3);
        assert_eq!(cfg.storage.database_path, "dokkan.db");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_file_is_error() {
        assert!(Config::parse("[scraper]\nbatch_size = \"many\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MAX_RETRIES", "5"),
            ("REQUEST_TIMEOUT", "2500"),
            ("BATCH_SIZE", "0"),
            ("CONCURRENT_LIMIT", "lots"),
            ("DB_PATH", "/tmp/x.db"),
            ("PORT", "9000"),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.scraper.max_retries, 5);
        assert_eq!(cfg.scraper.request_timeout_secs, 3);
        assert_eq!(cfg.scraper.batch_size, 1);
        assert_eq!(cfg.scraper.concurrent_limit, 5);
        assert_eq!(cfg.storage.database_path, "/tmp/x.db");
        assert_eq!(cfg.storage.data_dir, "data");
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn test_category_url() {
        let cfg = ScraperConfig {
            base_url: "https://w.test/".to_string(),
            ..ScraperConfig::default()
        };
        assert_eq!(cfg.category_url("LR"), "https://w.test/wiki/Category:LR");
    }
}
