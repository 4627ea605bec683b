//! Error types for stock data operations

use thiserror::Error;

/// Stock data specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Yahoo Finance returned an error or an unusable response
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Upstream payload is missing fields the report needs
    #[error("Unexpected data for {ticker}: {reason}")]
    DataShape { ticker: String, reason: String },

    /// Name outside the fixed set of stock tools
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StockError {
    /// Build a data-shape error for a ticker
    pub fn data_shape(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataShape {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<yfin_utils::ConfigError> for StockError {
    fn from(err: yfin_utils::ConfigError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

/// Convert StockError to yfin_tools::Error
impl From<StockError> for yfin_tools::Error {
    fn from(err: StockError) -> Self {
        match err {
            StockError::UnknownTool(name) => yfin_tools::Error::UnknownTool(name),
            other => yfin_tools::Error::ExecutionFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::UnknownTool("not_a_real_tool".to_string());
        assert_eq!(err.to_string(), "Unknown tool: not_a_real_tool");

        let err = StockError::data_shape("AAPL", "news item 0 has no title");
        assert_eq!(
            err.to_string(),
            "Unexpected data for AAPL: news item 0 has no title"
        );
    }

    #[test]
    fn test_error_conversion() {
        let tool_err: yfin_tools::Error =
            StockError::YahooFinanceError("Not Found".to_string()).into();

        match tool_err {
            yfin_tools::Error::ExecutionFailed(msg) => {
                assert!(msg.contains("Yahoo Finance error"));
            }
            _ => panic!("Expected ExecutionFailed variant"),
        }

        let tool_err: yfin_tools::Error = StockError::UnknownTool("nope".to_string()).into();
        assert!(matches!(tool_err, yfin_tools::Error::UnknownTool(_)));
    }
}
