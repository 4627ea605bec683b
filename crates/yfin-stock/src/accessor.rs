//! Text reports over a market data source

use std::sync::Arc;
use tracing::debug;

use crate::api::MarketDataSource;
use crate::catalog::StockTool;
use crate::error::Result;
use crate::formatter::{self, report};

/// Report returned for every ticker when the requested method is not a stock tool
pub const INVALID_METHOD: &str = "Invalid method, no data found.";

/// The six stock lookups, each producing a labelled text report
pub struct StockTools<S> {
    source: Arc<S>,
}

impl<S> Clone for StockTools<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: MarketDataSource> StockTools<S> {
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn balance_sheet(&self, ticker: &str) -> Result<String> {
        let statement = self.source.balance_sheet(ticker).await?;
        Ok(report(
            StockTool::BalanceSheet.label(),
            &formatter::render_statement(&statement),
        ))
    }

    pub async fn cash_flow(&self, ticker: &str) -> Result<String> {
        let statement = self.source.cash_flow(ticker).await?;
        Ok(report(
            StockTool::CashFlow.label(),
            &formatter::render_statement(&statement),
        ))
    }

    pub async fn income_statement(&self, ticker: &str) -> Result<String> {
        let statement = self.source.income_statement(ticker).await?;
        Ok(report(
            StockTool::IncomeStatement.label(),
            &formatter::render_statement(&statement),
        ))
    }

    pub async fn basic_stock_information(&self, ticker: &str) -> Result<String> {
        let info = self.source.info(ticker).await?;
        Ok(report(
            StockTool::BasicStockInformation.label(),
            &formatter::render_info(&info),
        ))
    }

    pub async fn analyst_recommendations(&self, ticker: &str) -> Result<String> {
        let trends = self.source.recommendations(ticker).await?;
        Ok(report(
            StockTool::AnalystRecommendations.label(),
            &formatter::render_recommendations(&trends),
        ))
    }

    pub async fn stock_news(&self, ticker: &str) -> Result<String> {
        let items = self.source.news(ticker).await?;
        Ok(report(
            StockTool::StockNews.label(),
            &formatter::news_titles(ticker, &items)?,
        ))
    }

    /// Run one lookup by tool
    pub async fn run(&self, tool: StockTool, ticker: &str) -> Result<String> {
        debug!(tool = %tool, ticker = %ticker, "Running stock lookup");

        match tool {
            StockTool::BalanceSheet => self.balance_sheet(ticker).await,
            StockTool::CashFlow => self.cash_flow(ticker).await,
            StockTool::IncomeStatement => self.income_statement(ticker).await,
            StockTool::BasicStockInformation => self.basic_stock_information(ticker).await,
            StockTool::AnalystRecommendations => self.analyst_recommendations(ticker).await,
            StockTool::StockNews => self.stock_news(ticker).await,
        }
    }

    /// Run the lookup named `method` for each ticker, in order
    ///
    /// An unknown method is not an error: every ticker maps to [`INVALID_METHOD`].
    /// The first upstream failure aborts the batch.
    pub async fn run_for_multiple_tickers<T: AsRef<str>>(
        &self,
        tickers: &[T],
        method: &str,
    ) -> Result<Vec<(String, String)>> {
        let Ok(tool) = method.parse::<StockTool>() else {
            debug!(method = %method, "Unknown method for batch lookup");
            return Ok(tickers
                .iter()
                .map(|t| (t.as_ref().to_string(), INVALID_METHOD.to_string()))
                .collect());
        };

        let mut reports = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let ticker = ticker.as_ref();
            reports.push((ticker.to_string(), self.run(tool, ticker).await?));
        }
        Ok(reports)
    }
}
