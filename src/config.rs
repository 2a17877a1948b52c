use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Crawler settings.
///
/// Defaults target the Fakebook site; a YAML file named by `CRAWLER_CONFIG`
/// may override any field, and `CRAWLER_HOST`, `CRAWLER_PORT` and
/// `CRAWLER_LOG` override the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawl: CrawlConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub host: String,
    pub port: u16,
    /// Login form path, used for both the GET and the credential POST
    pub login_path: String,
    /// First path placed on the frontier
    pub root_path: String,
    /// Only links starting with this prefix are followed
    pub link_prefix: String,
    /// Value of the `User` identification header
    pub identity: String,
    pub user_agent: String,
    /// Largest response, head plus body, buffered before the exchange fails
    pub max_response_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Stop once this many distinct flags are collected
    pub flag_target: usize,
    pub retry: RetryPolicy,
}

/// How often a path answering 500 (or with no readable status) is refetched.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    /// Fetch attempts per path; `None` retries until success
    pub max_attempts: Option<u32>,
    /// Pause before each retry, in milliseconds
    pub backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            crawl: CrawlConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: "webcrawler-site.ccs.neu.edu".to_string(),
            port: 80,
            login_path: "/accounts/login/?next=/fakebook/".to_string(),
            root_path: "/".to_string(),
            link_prefix: "/fakebook".to_string(),
            identity: "fakebook-crawler".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_4) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/37.0.2062.120 Safari/537.36"
                .to_string(),
            max_response_bytes: 8 * 1024 * 1024,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            flag_target: 5,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff_ms: 0,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Whether another attempt is allowed after `attempts` fetches.
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("CRAWLER_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml(&raw).with_context(|| format!("parsing config file {}", path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(host) = std::env::var("CRAWLER_HOST") {
            cfg.site.host = host;
        }
        if let Ok(port) = std::env::var("CRAWLER_PORT") {
            cfg.site.port = port
                .parse()
                .with_context(|| format!("invalid CRAWLER_PORT {:?}", port))?;
        }
        if let Ok(level) = std::env::var("CRAWLER_LOG") {
            cfg.log_level = level;
        }

        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw)?;
        Ok(cfg)
    }

    /// Parsed log level, falling back to INFO for unknown names.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
