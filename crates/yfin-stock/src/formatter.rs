//! Plain-text rendering of stock data

use comfy_table::{CellAlignment, Table, presets};
use serde_json::Value;

use crate::error::{Result, StockError};
use crate::model::{CompanyInfo, FinancialStatement, RecommendationTrend};

/// Body rendered for a table without rows
pub const EMPTY_TABLE: &str = "Empty DataFrame";

/// Prefix a report body with its label
pub fn report(label: &str, body: &str) -> String {
    format!("{label}:\n{body}")
}

/// Render a statement as line items by period, newest period first
pub fn render_statement(statement: &FinancialStatement) -> String {
    if statement.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let mut table = borderless_table();
    let header: Vec<String> = std::iter::once(String::new())
        .chain(statement.periods.iter().cloned())
        .collect();
    table.set_header(header);

    for row in &statement.rows {
        let cells: Vec<String> = std::iter::once(humanize(&row.item))
            .chain(row.values.iter().map(|value| format_number(*value)))
            .collect();
        table.add_row(cells);
    }

    align_right_from(&mut table, 1, statement.periods.len() + 1);
    table.to_string()
}

/// Render company info as `key: value` lines in key order
pub fn render_info(info: &CompanyInfo) -> String {
    info.iter()
        .map(|(key, value)| format!("{key}: {}", scalar(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render recommendation trends, one row per period
pub fn render_recommendations(trends: &[RecommendationTrend]) -> String {
    if trends.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let mut table = borderless_table();
    table.set_header(vec![
        "period",
        "strongBuy",
        "buy",
        "hold",
        "sell",
        "strongSell",
    ]);
    for trend in trends {
        table.add_row(vec![
            trend.period.clone(),
            trend.strong_buy.to_string(),
            trend.buy.to_string(),
            trend.hold.to_string(),
            trend.sell.to_string(),
            trend.strong_sell.to_string(),
        ]);
    }

    align_right_from(&mut table, 1, 6);
    table.to_string()
}

/// Join news titles with newlines
///
/// The title is read from `content.title`, falling back to a top-level `title`.
/// An item with neither fails the whole lookup.
pub fn news_titles(ticker: &str, items: &[Value]) -> Result<String> {
    let titles = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.pointer("/content/title")
                .or_else(|| item.get("title"))
                .and_then(Value::as_str)
                .ok_or_else(|| StockError::data_shape(ticker, format!("news item {idx} has no title")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(titles.join("\n"))
}

fn borderless_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table
}

fn align_right_from(table: &mut Table, first: usize, end: usize) {
    for idx in first..end {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn format_number(value: Option<f64>) -> String {
    match value {
        None => "NaN".to_string(),
        Some(v) if v.fract().abs() < f64::EPSILON && v.abs() < 1e15 => format!("{v:.0}"),
        Some(v) => v.to_string(),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

/// Split a CamelCase line item into words, keeping acronyms together
fn humanize(item: &str) -> String {
    let chars: Vec<char> = item.chars().collect();
    let mut out = String::with_capacity(item.len() + 8);

    for (idx, &ch) in chars.iter().enumerate() {
        if idx > 0 && ch.is_ascii_uppercase() {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push(' ');
            }
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StatementKind, StatementRow};
    use serde_json::json;

    fn statement() -> FinancialStatement {
        FinancialStatement {
            ticker: "AAPL".to_string(),
            kind: StatementKind::BalanceSheet,
            periods: vec!["2024-09-30".to_string(), "2023-09-30".to_string()],
            rows: vec![
                StatementRow {
                    item: "TotalAssets".to_string(),
                    values: vec![Some(364_980_000_000.0), Some(352_583_000_000.0)],
                },
                StatementRow {
                    item: "NetPPE".to_string(),
                    values: vec![Some(45_680_000_000.0), None],
                },
            ],
        }
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("TotalAssets"), "Total Assets");
        assert_eq!(humanize("NetPPE"), "Net PPE");
        assert_eq!(humanize("EBITDA"), "EBITDA");
        assert_eq!(humanize("DilutedEPS"), "Diluted EPS");
        assert_eq!(humanize("EPSGrowth"), "EPS Growth");
    }

    #[test]
    fn test_render_statement() {
        let text = render_statement(&statement());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("2024-09-30"));
        assert!(lines[0].find("2024-09-30") < lines[0].find("2023-09-30"));
        assert!(lines[1].contains("Total Assets"));
        assert!(lines[1].contains("364980000000"));
        assert!(lines[2].contains("Net PPE"));
        assert!(lines[2].trim_end().ends_with("NaN"));
    }

    #[test]
    fn test_render_empty_tables() {
        let empty = FinancialStatement::empty("ZZZZ", StatementKind::IncomeStatement);
        assert_eq!(render_statement(&empty), EMPTY_TABLE);
        assert_eq!(render_recommendations(&[]), EMPTY_TABLE);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(None), "NaN");
        assert_eq!(format_number(Some(1200.0)), "1200");
        assert_eq!(format_number(Some(6.08)), "6.08");
        assert_eq!(format_number(Some(-3.0)), "-3");
    }

    #[test]
    fn test_render_info() {
        let mut info = CompanyInfo::new();
        info.insert("symbol", json!("AAPL"));
        info.insert("currentPrice", json!(227.5));
        info.insert("dividendRate", Value::Null);

        assert_eq!(
            render_info(&info),
            "currentPrice: 227.5\ndividendRate: None\nsymbol: AAPL"
        );
    }

    #[test]
    fn test_render_recommendations() {
        let trends = vec![
            RecommendationTrend {
                period: "0m".to_string(),
                strong_buy: 8,
                buy: 24,
                hold: 12,
                sell: 1,
                strong_sell: 2,
            },
            RecommendationTrend {
                period: "-1m".to_string(),
                strong_buy: 7,
                buy: 23,
                hold: 13,
                sell: 1,
                strong_sell: 2,
            },
        ];
        let text = render_recommendations(&trends);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("strongBuy"));
        assert!(lines[0].contains("strongSell"));
        assert!(lines[1].trim_start().starts_with("0m"));
        assert!(lines[2].trim_start().starts_with("-1m"));
    }

    #[test]
    fn test_news_titles() {
        let items = vec![
            json!({"id": "1", "content": {"title": "Apple hits record"}}),
            json!({"title": "Legacy layout headline"}),
        ];
        assert_eq!(
            news_titles("AAPL", &items).unwrap(),
            "Apple hits record\nLegacy layout headline"
        );
        assert_eq!(news_titles("AAPL", &[]).unwrap(), "");
    }

    #[test]
    fn test_news_item_without_title_fails() {
        let items = vec![json!({"content": {"title": "ok"}}), json!({"content": {}})];
        let err = news_titles("AAPL", &items).unwrap_err();
        assert!(matches!(err, StockError::DataShape { ref reason, .. } if reason.contains("item 1")));
    }

    #[test]
    fn test_report_label() {
        assert_eq!(report("News", "a\nb"), "News:\na\nb");
    }
}
