//! Yahoo Finance API client

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::header::REFERER;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;
use yahoo_finance_api as yahoo;

use super::MarketDataSource;
use super::session::CrumbSession;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::model::{CompanyInfo, FinancialStatement, RecommendationTrend, StatementKind};

const FINANCE_REFERER: &str = "https://finance.yahoo.com/";

/// Start of the fundamentals window (2016-12-31T00:00:00Z)
const SERIES_PERIOD_START: i64 = 1_483_142_400;

/// Chart window and bar size the latest quote is taken from
const QUOTE_RANGE: &str = "1mo";
const QUOTE_INTERVAL: &str = "1d";

const INFO_MODULES: &str = "price,summaryProfile,summaryDetail";
const RECOMMENDATION_MODULE: &str = "recommendationTrend";

/// Yahoo Finance API client
///
/// Performs the cookie/crumb handshake lazily on the first request and keeps
/// the crumb for its lifetime, repeating the handshake once when Yahoo
/// answers 401 or 403.
pub struct YahooFinanceClient {
    http: Client,
    config: Arc<StockConfig>,
    session: CrumbSession,
}

impl YahooFinanceClient {
    /// Create a client from a validated configuration
    pub fn new(config: Arc<StockConfig>) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            session: CrumbSession::new(),
        })
    }

    /// Create a client configured from `YFIN_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(Arc::new(StockConfig::from_env()?))
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    /// GET a Yahoo JSON endpoint with the crumb attached
    async fn get_json(&self, url: &Url, query: &[(&str, String)]) -> Result<Value> {
        let mut refreshed = false;

        loop {
            let crumb = self.session.crumb(&self.http, &self.config).await?;
            let response = self
                .http
                .get(url.clone())
                .header(REFERER, FINANCE_REFERER)
                .query(query)
                .query(&[("crumb", crumb.as_str())])
                .send()
                .await?;

            let status = response.status();
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) && !refreshed {
                warn!(url = %url, status = %status, "Yahoo rejected crumb, repeating handshake");
                self.session.invalidate().await;
                refreshed = true;
                continue;
            }

            let body = response.text().await?;
            let value: Value = match serde_json::from_str(&body) {
                Ok(value) => value,
                Err(e) if status.is_success() => return Err(e.into()),
                Err(_) => return Err(StockError::YahooFinanceError(format!("HTTP {status}"))),
            };

            if let Some(description) = yahoo_error(&value) {
                return Err(StockError::YahooFinanceError(description));
            }
            if !status.is_success() {
                return Err(StockError::YahooFinanceError(format!("HTTP {status}")));
            }

            debug!(url = %url, "Yahoo request succeeded");
            return Ok(value);
        }
    }

    async fn statement(&self, ticker: &str, kind: StatementKind) -> Result<FinancialStatement> {
        let url = endpoint(
            &self.config.query2_url,
            &["ws", "fundamentals-timeseries", "v1", "finance", "timeseries", ticker],
        )?;
        let now = chrono::Utc::now().timestamp();
        let query = [
            ("symbol", ticker.to_string()),
            ("type", kind.series_types().join(",")),
            ("period1", SERIES_PERIOD_START.to_string()),
            ("period2", now.to_string()),
        ];

        let body = self.get_json(&url, &query).await?;
        parse_timeseries(ticker, kind, &body)
    }

    async fn quote_summary(&self, ticker: &str, modules: &str) -> Result<Value> {
        let url = endpoint(
            &self.config.query2_url,
            &["v10", "finance", "quoteSummary", ticker],
        )?;
        let body = self
            .get_json(&url, &[("modules", modules.to_string())])
            .await?;

        Ok(body
            .pointer("/quoteSummary/result/0")
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Latest daily quote from the chart API on the primary query host
    async fn latest_quote(&self, ticker: &str) -> Result<yahoo::Quote> {
        let url = endpoint(&self.config.query1_url, &["v8", "finance", "chart", ticker])?;
        let query = [
            ("symbol", ticker.to_string()),
            ("interval", QUOTE_INTERVAL.to_string()),
            ("range", QUOTE_RANGE.to_string()),
        ];

        let body = self.get_json(&url, &query).await?;
        parse_last_quote(body)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn balance_sheet(&self, ticker: &str) -> Result<FinancialStatement> {
        self.statement(ticker, StatementKind::BalanceSheet).await
    }

    async fn cash_flow(&self, ticker: &str) -> Result<FinancialStatement> {
        self.statement(ticker, StatementKind::CashFlow).await
    }

    async fn income_statement(&self, ticker: &str) -> Result<FinancialStatement> {
        self.statement(ticker, StatementKind::IncomeStatement).await
    }

    async fn info(&self, ticker: &str) -> Result<CompanyInfo> {
        let summary = self.quote_summary(ticker, INFO_MODULES).await?;
        let mut info = flatten_quote_summary(&summary);

        match self.latest_quote(ticker).await {
            Ok(quote) => {
                info.insert_if_absent("open", Value::from(quote.open));
                info.insert_if_absent("dayHigh", Value::from(quote.high));
                info.insert_if_absent("dayLow", Value::from(quote.low));
                info.insert_if_absent("close", Value::from(quote.close));
                info.insert_if_absent("volume", Value::from(quote.volume));
                if let Some(time) = DateTime::from_timestamp(quote.timestamp, 0) {
                    info.insert("lastQuoteTime", Value::from(time.to_rfc3339()));
                }
            }
            // quote fields are supplementary, the summary alone is still a valid answer
            Err(e) => warn!(ticker = %ticker, error = %e, "Latest quote unavailable"),
        }

        if !info.is_empty() {
            info.insert_if_absent("symbol", Value::from(ticker));
        }
        Ok(info)
    }

    async fn recommendations(&self, ticker: &str) -> Result<Vec<RecommendationTrend>> {
        let summary = self.quote_summary(ticker, RECOMMENDATION_MODULE).await?;
        parse_recommendations(&summary)
    }

    async fn news(&self, ticker: &str) -> Result<Vec<Value>> {
        let url = endpoint(&self.config.query2_url, &["v1", "finance", "search"])?;
        let query = [
            ("q", ticker.to_string()),
            ("quotesCount", "0".to_string()),
            ("newsCount", self.config.news_count.to_string()),
        ];

        let body = self.get_json(&url, &query).await?;
        Ok(parse_news(&body))
    }
}

/// `base` with `segments` appended, each escaped as a single path segment
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| StockError::ConfigError(format!("invalid base URL ({base}): {e}")))?;
    url.path_segments_mut()
        .map_err(|()| StockError::ConfigError(format!("base URL cannot carry a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Description of a Yahoo `error` object found in any top-level envelope
fn yahoo_error(body: &Value) -> Option<String> {
    body.as_object()?.values().find_map(|envelope| {
        let error = envelope.get("error").filter(|e| !e.is_null())?;
        Some(
            error
                .get("description")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string),
        )
    })
}

/// Turn a fundamentals time series response into a statement
fn parse_timeseries(ticker: &str, kind: StatementKind, body: &Value) -> Result<FinancialStatement> {
    let Some(results) = body.pointer("/timeseries/result") else {
        return Err(StockError::data_shape(ticker, "missing timeseries result"));
    };
    let Some(results) = results.as_array() else {
        // Yahoo answers `null` for symbols it does not know
        return Ok(FinancialStatement::empty(ticker, kind));
    };

    let series = results
        .iter()
        .filter_map(|entry| {
            let series_type = entry.pointer("/meta/type/0")?.as_str()?;
            let item = series_type.strip_prefix("annual").unwrap_or(series_type);
            let points = entry
                .get(series_type)
                .and_then(Value::as_array)
                .map(|points| {
                    points
                        .iter()
                        .filter_map(|point| {
                            let date = point.get("asOfDate")?.as_str()?;
                            let value = point.pointer("/reportedValue/raw")?.as_f64()?;
                            Some((date.to_string(), value))
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some((item.to_string(), points))
        })
        .collect();

    Ok(FinancialStatement::from_series(ticker, kind, series))
}

/// Flatten quoteSummary modules into scalar fields, earlier modules winning
fn flatten_quote_summary(summary: &Value) -> CompanyInfo {
    let mut info = CompanyInfo::new();
    let Some(modules) = summary.as_object() else {
        return info;
    };

    for module in INFO_MODULES.split(',') {
        let Some(fields) = modules.get(module).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if key == "maxAge" {
                continue;
            }
            if let Some(value) = scalar_field(value) {
                info.insert_if_absent(key.clone(), value);
            }
        }
    }

    info
}

/// Reduce a Yahoo field to a scalar, preferring `raw` over `fmt`
fn scalar_field(value: &Value) -> Option<Value> {
    match value {
        Value::Object(map) => map
            .get("raw")
            .or_else(|| map.get("fmt"))
            .filter(|v| !v.is_object() && !v.is_array())
            .cloned(),
        Value::Array(_) => None,
        scalar => Some(scalar.clone()),
    }
}

fn parse_last_quote(body: Value) -> Result<yahoo::Quote> {
    yahoo::YResponse::from_json(body)
        .and_then(|response| response.last_quote())
        .map_err(|e| StockError::YahooFinanceError(e.to_string()))
}

fn parse_recommendations(summary: &Value) -> Result<Vec<RecommendationTrend>> {
    match summary.pointer("/recommendationTrend/trend") {
        Some(trend) if trend.is_array() => Ok(serde_json::from_value(trend.clone())?),
        _ => Ok(Vec::new()),
    }
}

fn parse_news(body: &Value) -> Vec<Value> {
    body.get("news")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
