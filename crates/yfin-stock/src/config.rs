//! Configuration for the Yahoo Finance data client

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use yfin_utils::{env_parse, env_string};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Configuration for stock data lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Base URL of the primary query host
    pub query1_url: String,

    /// Base URL of the secondary query host
    pub query2_url: String,

    /// Page visited to obtain the session cookie
    pub cookie_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Number of news items requested per lookup
    pub news_count: usize,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            query1_url: "https://query1.finance.yahoo.com".to_string(),
            query2_url: "https://query2.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            news_count: 10,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load defaults overridden by `YFIN_*` environment variables
    ///
    /// Recognised variables: `YFIN_YAHOO_QUERY1_URL`, `YFIN_YAHOO_QUERY2_URL`,
    /// `YFIN_YAHOO_COOKIE_URL`, `YFIN_REQUEST_TIMEOUT_SECS`, `YFIN_NEWS_COUNT`.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(url) = env_string("YFIN_YAHOO_QUERY1_URL") {
            builder = builder.query1_url(url);
        }
        if let Some(url) = env_string("YFIN_YAHOO_QUERY2_URL") {
            builder = builder.query2_url(url);
        }
        if let Some(url) = env_string("YFIN_YAHOO_COOKIE_URL") {
            builder = builder.cookie_url(url);
        }
        if let Some(secs) = env_parse::<u64>("YFIN_REQUEST_TIMEOUT_SECS")? {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(count) = env_parse::<usize>("YFIN_NEWS_COUNT")? {
            builder = builder.news_count(count);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("query1_url", &self.query1_url),
            ("query2_url", &self.query2_url),
            ("cookie_url", &self.cookie_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                StockError::ConfigError(format!("{name} is not a valid URL ({value}): {e}"))
            })?;
        }

        if self.news_count == 0 {
            return Err(StockError::ConfigError(
                "news_count must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Crumb endpoints, tried in order
    pub fn crumb_urls(&self) -> [String; 2] {
        [
            format!("{}/v1/test/getcrumb", self.query1_url.trim_end_matches('/')),
            format!("{}/v1/test/getcrumb", self.query2_url.trim_end_matches('/')),
        ]
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    query1_url: Option<String>,
    query2_url: Option<String>,
    cookie_url: Option<String>,
    user_agent: Option<String>,
    request_timeout: Option<Duration>,
    news_count: Option<usize>,
}

impl StockConfigBuilder {
    /// Set the primary query host
    pub fn query1_url(mut self, url: impl Into<String>) -> Self {
        self.query1_url = Some(url.into());
        self
    }

    /// Set the secondary query host
    pub fn query2_url(mut self, url: impl Into<String>) -> Self {
        self.query2_url = Some(url.into());
        self
    }

    /// Set the cookie page
    pub fn cookie_url(mut self, url: impl Into<String>) -> Self {
        self.cookie_url = Some(url.into());
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the number of news items to request
    pub fn news_count(mut self, count: usize) -> Self {
        self.news_count = Some(count);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let default = StockConfig::default();

        let config = StockConfig {
            query1_url: self.query1_url.unwrap_or(default.query1_url),
            query2_url: self.query2_url.unwrap_or(default.query2_url),
            cookie_url: self.cookie_url.unwrap_or(default.cookie_url),
            user_agent: self.user_agent.unwrap_or(default.user_agent),
            request_timeout: self.request_timeout.unwrap_or(default.request_timeout),
            news_count: self.news_count.unwrap_or(default.news_count),
        };

        config.validate()?;
        Ok(config)
    }
}
