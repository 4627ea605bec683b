//! Market data sources

mod session;
pub mod yahoo;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::model::{CompanyInfo, FinancialStatement, RecommendationTrend};

pub use yahoo::YahooFinanceClient;

/// Upstream provider of the datasets behind the stock tools
///
/// Every method takes a ticker symbol as given by the caller. Unknown tickers
/// are not an error here: sources return whatever the provider has, which is
/// usually empty data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Annual balance sheet
    async fn balance_sheet(&self, ticker: &str) -> Result<FinancialStatement>;

    /// Annual cash flow statement
    async fn cash_flow(&self, ticker: &str) -> Result<FinancialStatement>;

    /// Annual income statement
    async fn income_statement(&self, ticker: &str) -> Result<FinancialStatement>;

    /// Company profile and quote fields
    async fn info(&self, ticker: &str) -> Result<CompanyInfo>;

    /// Analyst rating counts, most recent period first
    async fn recommendations(&self, ticker: &str) -> Result<Vec<RecommendationTrend>>;

    /// Raw news items as delivered by the provider
    async fn news(&self, ticker: &str) -> Result<Vec<Value>>;
}
