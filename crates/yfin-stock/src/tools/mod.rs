//! In-process tool bindings for the stock lookups

mod multi_ticker;
mod stock_function;

pub use multi_ticker::{MULTI_TICKER_TOOL, MultiTickerTool};
pub use stock_function::StockFunctionTool;

use std::sync::Arc;
use yfin_tools::ToolRegistry;

use crate::accessor::StockTools;
use crate::api::MarketDataSource;
use crate::catalog::StockTool;

/// Register the six stock functions, in listing order, then the batch tool
pub fn register_stock_tools<S: MarketDataSource + 'static>(
    registry: &ToolRegistry,
    tools: &StockTools<S>,
) {
    for tool in StockTool::ALL {
        registry.register(Arc::new(StockFunctionTool::new(tool, tools.clone())));
    }
    registry.register(Arc::new(MultiTickerTool::new(tools.clone())));
}
