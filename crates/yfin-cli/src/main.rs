//! Yahoo Finance MCP server
//!
//! Serves the six stock tools over SSE (default), stdio or streamable HTTP, or
//! runs them locally from the command line.
//!
//! # Usage
//!
//! ```bash
//! yahoo-finance-mcp                                  # SSE on 127.0.0.1:8000
//! yahoo-finance-mcp --server-type stdio              # for desktop MCP clients
//! yahoo-finance-mcp serve --transport streamable-http --port 9000
//! yahoo-finance-mcp tools
//! yahoo-finance-mcp call analyst_recommendations MSFT
//! yahoo-finance-mcp batch stock_news AAPL MSFT
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use yfin_mcp::{McpServer, ServerConfig, Transport, transport};
use yfin_stock::{YahooFinanceClient, YahooStockTools, register_stock_tools};
use yfin_tools::ToolRegistry;
use yfin_utils::{LogConfig, LogFormat, LogTarget, init_tracing};

#[derive(Parser, Debug)]
#[command(name = "yahoo-finance-mcp", version)]
#[command(about = "Yahoo Finance stock tools over the Model Context Protocol", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,

    /// Log output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the tools to MCP clients (default)
    Serve(ServeArgs),

    /// List the available tools
    Tools,

    /// Run one tool for one ticker and print the report
    Call {
        /// Tool name, e.g. balance_sheet
        tool: String,
        /// Stock ticker symbol
        ticker: String,
    },

    /// Run one tool for several tickers
    Batch {
        /// Tool name, e.g. stock_news
        method: String,
        /// Stock ticker symbols
        #[arg(required = true)]
        tickers: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Transport: sse, stdio or streamable-http
    #[arg(long, visible_alias = "server-type", alias = "server_type")]
    transport: Option<Transport>,

    /// Bind host for HTTP transports
    #[arg(long)]
    host: Option<String>,

    /// Bind port for HTTP transports
    #[arg(short, long)]
    port: Option<u16>,

    /// Prefix for every HTTP route
    #[arg(long)]
    mount_path: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ServeArgs {
    /// Defaults, then the file, then the environment, then flags
    fn resolve(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServerConfig::default(),
        };
        config.apply_env()?;

        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(mount_path) = &self.mount_path {
            config.mount_path.clone_from(mount_path);
        }
        config.normalize();
        config.validate()?;
        Ok(config)
    }
}

fn log_config(cli: &Cli, target: LogTarget) -> LogConfig {
    let filter = if cli.verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "info"
    };
    LogConfig::new(filter)
        .with_format(cli.log_format)
        .with_target(target)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => serve(&cli, &cli.serve).await,
        Some(Command::Serve(args)) => serve(&cli, args).await,
        Some(Command::Tools) => {
            init_tracing(&log_config(&cli, LogTarget::Stderr))?;
            list_tools()
        }
        Some(Command::Call { tool, ticker }) => {
            init_tracing(&log_config(&cli, LogTarget::Stderr))?;
            call(tool, ticker).await
        }
        Some(Command::Batch { method, tickers }) => {
            init_tracing(&log_config(&cli, LogTarget::Stderr))?;
            batch(method, tickers).await
        }
    }
}

async fn serve(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;

    // stdout carries the protocol on stdio
    let target = match config.transport {
        Transport::Stdio => LogTarget::Stderr,
        Transport::Sse | Transport::StreamableHttp => LogTarget::Stdout,
    };
    init_tracing(&log_config(cli, target))?;

    info!(
        name = %config.name,
        transport = %config.transport,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Yahoo Finance MCP server"
    );

    let tools = YahooStockTools::new(YahooFinanceClient::from_env()?);
    let server = Arc::new(McpServer::from_config(tools, &config));

    match config.transport {
        Transport::Sse => transport::serve_sse(server, &config).await?,
        Transport::Stdio => transport::serve_stdio(server).await?,
        Transport::StreamableHttp => transport::serve_streamable_http(server, &config).await?,
    }

    info!("Server stopped");
    Ok(())
}

fn local_registry() -> anyhow::Result<ToolRegistry> {
    let tools = YahooStockTools::new(YahooFinanceClient::from_env()?);
    let registry = ToolRegistry::new();
    register_stock_tools(&registry, &tools);
    Ok(registry)
}

fn list_tools() -> anyhow::Result<()> {
    let registry = local_registry()?;
    for tool in registry.list_tools() {
        println!("{:<40} {}", tool.name(), tool.description());
    }
    Ok(())
}

async fn call(tool: &str, ticker: &str) -> anyhow::Result<()> {
    let registry = local_registry()?;
    let output = registry
        .execute(tool, json!({ "ticker": ticker }))
        .await
        .with_context(|| format!("{tool} failed for {ticker}"))?;

    print_output(&output);
    Ok(())
}

async fn batch(method: &str, tickers: &[String]) -> anyhow::Result<()> {
    let tools = YahooStockTools::new(YahooFinanceClient::from_env()?);
    let reports = tools.run_for_multiple_tickers(tickers, method).await?;

    for (ticker, report) in reports {
        println!("== {ticker} ==");
        println!("{report}");
        println!();
    }
    Ok(())
}

fn print_output(output: &Value) {
    match output {
        Value::String(text) => println!("{text}"),
        other => println!("{other:#}"),
    }
}
