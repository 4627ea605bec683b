//! Data returned by market data sources

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Which financial statement a table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    CashFlow,
    IncomeStatement,
}

impl StatementKind {
    /// Line items requested from the fundamentals time series, in display order
    pub fn line_items(self) -> &'static [&'static str] {
        match self {
            StatementKind::BalanceSheet => &[
                "TotalAssets",
                "CurrentAssets",
                "CashAndCashEquivalents",
                "Receivables",
                "Inventory",
                "NetPPE",
                "Goodwill",
                "TotalLiabilitiesNetMinorityInterest",
                "CurrentLiabilities",
                "LongTermDebt",
                "TotalDebt",
                "StockholdersEquity",
                "RetainedEarnings",
                "WorkingCapital",
                "OrdinarySharesNumber",
            ],
            StatementKind::CashFlow => &[
                "OperatingCashFlow",
                "InvestingCashFlow",
                "FinancingCashFlow",
                "FreeCashFlow",
                "CapitalExpenditure",
                "DepreciationAndAmortization",
                "StockBasedCompensation",
                "ChangeInWorkingCapital",
                "RepurchaseOfCapitalStock",
                "CashDividendsPaid",
                "EndCashPosition",
            ],
            StatementKind::IncomeStatement => &[
                "TotalRevenue",
                "CostOfRevenue",
                "GrossProfit",
                "OperatingExpense",
                "ResearchAndDevelopment",
                "SellingGeneralAndAdministration",
                "OperatingIncome",
                "InterestExpense",
                "PretaxIncome",
                "TaxProvision",
                "NetIncome",
                "EBITDA",
                "BasicEPS",
                "DilutedEPS",
                "DilutedAverageShares",
            ],
        }
    }

    /// Time series type names for the annual frequency
    pub fn series_types(self) -> Vec<String> {
        self.line_items()
            .iter()
            .map(|item| format!("annual{item}"))
            .collect()
    }
}

/// One line item of a statement with a value per period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub item: String,
    /// Aligned with `FinancialStatement::periods`
    pub values: Vec<Option<f64>>,
}

/// A financial statement laid out as line items by reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub ticker: String,
    pub kind: StatementKind,
    /// Period end dates (`YYYY-MM-DD`), newest first
    pub periods: Vec<String>,
    pub rows: Vec<StatementRow>,
}

impl FinancialStatement {
    /// An empty statement, as returned for tickers without data
    pub fn empty(ticker: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            ticker: ticker.into(),
            kind,
            periods: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build a statement from per-item series of `(period, value)` points
    ///
    /// Items keep the order given by [`StatementKind::line_items`]; items not in
    /// that list follow in input order. Items without any point are dropped.
    pub fn from_series(
        ticker: impl Into<String>,
        kind: StatementKind,
        series: Vec<(String, Vec<(String, f64)>)>,
    ) -> Self {
        let periods: Vec<String> = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(period, _)| period.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect();

        let mut series: Vec<_> = series
            .into_iter()
            .filter(|(_, points)| !points.is_empty())
            .collect();
        let rank = |item: &str| {
            kind.line_items()
                .iter()
                .position(|known| *known == item)
                .unwrap_or(usize::MAX)
        };
        // stable sort keeps input order among unknown items
        series.sort_by_key(|(item, _)| rank(item));

        let rows = series
            .into_iter()
            .map(|(item, points)| {
                let by_period: BTreeMap<String, f64> = points.into_iter().collect();
                StatementRow {
                    values: periods.iter().map(|p| by_period.get(p).copied()).collect(),
                    item,
                }
            })
            .collect();

        Self {
            ticker: ticker.into(),
            kind,
            periods,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Analyst rating counts for one period (`0m` is the current month, `-1m` the previous, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationTrend {
    pub period: String,
    #[serde(default)]
    pub strong_buy: u32,
    #[serde(default)]
    pub buy: u32,
    #[serde(default)]
    pub hold: u32,
    #[serde(default)]
    pub sell: u32,
    #[serde(default)]
    pub strong_sell: u32,
}

/// Flat company and quote fields, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyInfo {
    fields: BTreeMap<String, Value>,
}

impl CompanyInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field unless it is already present
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: Value) {
        self.fields.entry(key.into()).or_insert(value);
    }

    /// Insert or overwrite a field
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
