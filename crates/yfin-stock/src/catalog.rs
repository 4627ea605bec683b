//! The fixed set of stock lookups exposed as tools

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use yfin_tools::schema;

use crate::error::StockError;

/// Name of the single required argument of every stock tool
pub const TICKER_ARG: &str = "ticker";

/// One of the six stock lookups
///
/// The set is closed: dispatch matches on this enum exhaustively, so adding a
/// lookup means adding a variant here and a case everywhere it is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTool {
    BalanceSheet,
    CashFlow,
    IncomeStatement,
    BasicStockInformation,
    AnalystRecommendations,
    StockNews,
}

impl StockTool {
    /// Every tool, in listing order
    pub const ALL: [StockTool; 6] = [
        StockTool::BalanceSheet,
        StockTool::CashFlow,
        StockTool::IncomeStatement,
        StockTool::BasicStockInformation,
        StockTool::AnalystRecommendations,
        StockTool::StockNews,
    ];

    /// Wire name of the tool
    pub fn as_str(self) -> &'static str {
        match self {
            StockTool::BalanceSheet => "balance_sheet",
            StockTool::CashFlow => "cash_flow",
            StockTool::IncomeStatement => "income_statement",
            StockTool::BasicStockInformation => "basic_stock_information",
            StockTool::AnalystRecommendations => "analyst_recommendations",
            StockTool::StockNews => "stock_news",
        }
    }

    /// Human description advertised to clients
    pub fn description(self) -> &'static str {
        match self {
            StockTool::BalanceSheet => {
                "Download the balance sheet from Yahoo Finance for a given stock ticker."
            }
            StockTool::CashFlow => "Return the cash flow statement of a stock from Yahoo Finance.",
            StockTool::IncomeStatement => "Get the income statement for a given stock ticker.",
            StockTool::BasicStockInformation => {
                "Return basic stock information, e.g. price, description and name."
            }
            StockTool::AnalystRecommendations => {
                "Get the analyst recommendations for a given stock ticker."
            }
            StockTool::StockNews => "Get the most recent news titles for a given stock ticker.",
        }
    }

    /// Label that starts every report produced by the tool
    pub fn label(self) -> &'static str {
        match self {
            StockTool::BalanceSheet => "Balance Sheet",
            StockTool::CashFlow => "Cash Flow",
            StockTool::IncomeStatement => "Income Statement",
            StockTool::BasicStockInformation => "Basic Stock information",
            StockTool::AnalystRecommendations => "Recommendations",
            StockTool::StockNews => "News",
        }
    }

    /// JSON schema of the tool input: a single required `ticker` string
    pub fn input_schema(self) -> Value {
        schema::object(
            json!({
                TICKER_ARG: schema::string(Some("A stock ticker symbol, e.g. AAPL")),
            }),
            &[TICKER_ARG],
        )
    }

    /// Wire names of every tool, in listing order
    pub fn names() -> [&'static str; 6] {
        Self::ALL.map(StockTool::as_str)
    }
}

impl FromStr for StockTool {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockTool::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| StockError::UnknownTool(s.to_string()))
    }
}

impl fmt::Display for StockTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
