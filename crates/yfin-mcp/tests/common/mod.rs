//! Shared fixtures for transport tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use yfin_mcp::McpServer;
use yfin_stock::{
    CompanyInfo, FinancialStatement, MarketDataSource, RecommendationTrend, StatementKind,
    StockError, StockTools,
};
use yfin_stock::model::StatementRow;

/// Ticker for which every lookup fails upstream
pub const FAILING_TICKER: &str = "FAIL";

/// Deterministic market data for any ticker
pub struct FixtureSource;

fn check(ticker: &str) -> yfin_stock::Result<()> {
    if ticker == FAILING_TICKER {
        Err(StockError::YahooFinanceError("HTTP 503".to_string()))
    } else {
        Ok(())
    }
}

fn statement(ticker: &str, kind: StatementKind, item: &str) -> FinancialStatement {
    FinancialStatement {
        ticker: ticker.to_string(),
        kind,
        periods: vec!["2024-12-31".to_string(), "2023-12-31".to_string()],
        rows: vec![StatementRow {
            item: item.to_string(),
            values: vec![Some(1_000.0), None],
        }],
    }
}

#[async_trait]
impl MarketDataSource for FixtureSource {
    async fn balance_sheet(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
        check(ticker)?;
        Ok(statement(ticker, StatementKind::BalanceSheet, "TotalAssets"))
    }

    async fn cash_flow(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
        check(ticker)?;
        Ok(statement(ticker, StatementKind::CashFlow, "FreeCashFlow"))
    }

    async fn income_statement(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
        check(ticker)?;
        Ok(statement(ticker, StatementKind::IncomeStatement, "NetIncome"))
    }

    async fn info(&self, ticker: &str) -> yfin_stock::Result<CompanyInfo> {
        check(ticker)?;
        let mut info = CompanyInfo::new();
        info.insert("symbol", json!(ticker));
        info.insert("currency", json!("USD"));
        Ok(info)
    }

    async fn recommendations(&self, ticker: &str) -> yfin_stock::Result<Vec<RecommendationTrend>> {
        check(ticker)?;
        Ok(vec![RecommendationTrend {
            period: "0m".to_string(),
            strong_buy: 3,
            buy: 10,
            hold: 5,
            sell: 1,
            strong_sell: 0,
        }])
    }

    async fn news(&self, ticker: &str) -> yfin_stock::Result<Vec<Value>> {
        check(ticker)?;
        Ok(vec![json!({"content": {"title": format!("{ticker} news")}})])
    }
}

pub fn fixture_server() -> Arc<McpServer<FixtureSource>> {
    Arc::new(McpServer::new(StockTools::new(FixtureSource)))
}

pub fn call_tool(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}
