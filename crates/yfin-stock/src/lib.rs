//! Yahoo Finance stock lookups
//!
//! This crate answers six fixed questions about a stock ticker and renders each
//! answer as a labelled plain-text report:
//!
//! - `balance_sheet`, `cash_flow`, `income_statement`: annual statements as tables
//! - `basic_stock_information`: company profile and quote fields
//! - `analyst_recommendations`: rating counts per period
//! - `stock_news`: recent headlines
//!
//! Data comes from a [`MarketDataSource`]; [`YahooFinanceClient`] is the
//! production source. [`StockTools`] turns data into reports, and
//! [`register_stock_tools`] exposes them through a `yfin_tools::ToolRegistry`.
//!
//! # Example
//!
//! ```rust,ignore
//! use yfin_stock::{StockTool, YahooFinanceClient, YahooStockTools};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let tools = YahooStockTools::new(YahooFinanceClient::from_env()?);
//!     let report = tools.run(StockTool::AnalystRecommendations, "AAPL").await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod accessor;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formatter;
pub mod model;
pub mod tools;

pub use accessor::{INVALID_METHOD, StockTools};
pub use api::{MarketDataSource, YahooFinanceClient};
pub use catalog::{StockTool, TICKER_ARG};
pub use config::StockConfig;
pub use error::{Result, StockError};
pub use model::{CompanyInfo, FinancialStatement, RecommendationTrend, StatementKind};
pub use tools::{MULTI_TICKER_TOOL, MultiTickerTool, StockFunctionTool, register_stock_tools};

/// Stock lookups backed by Yahoo Finance
pub type YahooStockTools = StockTools<YahooFinanceClient>;
