//! Newline-delimited messages over standard input and output

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use yfin_stock::MarketDataSource;

use crate::Result;
use crate::error::MCPError;
use crate::protocol::JsonRpcResponse;
use crate::server::McpServer;

/// Serve on the process's stdin and stdout until stdin closes
pub async fn serve_stdio<S>(server: Arc<McpServer<S>>) -> Result<()>
where
    S: MarketDataSource + 'static,
{
    info!(server = %server.name(), "Serving MCP on stdio");
    serve_lines(&server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Read one message per line and write one response per line, in order
pub async fn serve_lines<S, R, W>(server: &McpServer<S>, reader: R, mut writer: W) -> Result<()>
where
    S: MarketDataSource,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => server.handle_message(line.trim()).await,
            Err(e) => {
                let err = MCPError::ParseError(e.to_string());
                warn!(error = %err, "Rejected message");
                Some(JsonRpcResponse::failure(Value::Null, err.to_rpc_error()))
            }
        };

        if let Some(response) = response {
            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    info!("Input closed, stopping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::io::AsyncReadExt;
    use yfin_stock::{
        CompanyInfo, FinancialStatement, RecommendationTrend, StatementKind, StockTools,
    };

    struct NewsOnlySource;

    #[async_trait]
    impl MarketDataSource for NewsOnlySource {
        async fn balance_sheet(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
            Ok(FinancialStatement::empty(ticker, StatementKind::BalanceSheet))
        }

        async fn cash_flow(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
            Ok(FinancialStatement::empty(ticker, StatementKind::CashFlow))
        }

        async fn income_statement(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
            Ok(FinancialStatement::empty(ticker, StatementKind::IncomeStatement))
        }

        async fn info(&self, _ticker: &str) -> yfin_stock::Result<CompanyInfo> {
            Ok(CompanyInfo::new())
        }

        async fn recommendations(
            &self,
            _ticker: &str,
        ) -> yfin_stock::Result<Vec<RecommendationTrend>> {
            Ok(Vec::new())
        }

        async fn news(&self, ticker: &str) -> yfin_stock::Result<Vec<Value>> {
            Ok(vec![json!({"content": {"title": format!("{ticker} headline")}})])
        }
    }

    #[tokio::test]
    async fn test_serve_lines() {
        let server = McpServer::new(StockTools::new(NewsOnlySource));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"stock_news","arguments":{"ticker":"TSLA"}}}"#,
            "\n",
        );

        let (mut client, server_side) = tokio::io::duplex(64 * 1024);
        serve_lines(&server, input.as_bytes(), server_side).await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        let responses: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["id"], 2);
        assert_eq!(
            responses[2]["result"]["content"][0]["text"],
            "News:\nTSLA headline"
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_serving() {
        let server = McpServer::new(StockTools::new(NewsOnlySource));
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.push(b'\n');
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping","params":{"x":""#);
        input.push(0xFF);
        input.extend_from_slice(b"\"}}\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#);
        input.push(b'\n');

        let (mut client, server_side) = tokio::io::duplex(64 * 1024);
        serve_lines(&server, input.as_slice(), server_side).await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        let responses: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["id"], 3);
        assert_eq!(responses[2]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let server = McpServer::new(StockTools::new(NewsOnlySource));
        let input = r#"{"jsonrpc":"2.0","id":8,"method":"ping"}"#;

        let (mut client, server_side) = tokio::io::duplex(1024);
        serve_lines(&server, input.as_bytes(), server_side).await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        let response: Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(response["id"], 8);
    }
}
