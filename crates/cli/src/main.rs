use clap::Parser;
use rootward_domain::{CliOverrides, Config};
use rootward_infrastructure::dns::resolver::{RecursiveResolver, WireExchange};
use rootward_infrastructure::dns::server::DnsServerHandler;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "rootward")]
#[command(version)]
#[command(about = "Recursive DNS resolver that answers from the root servers down")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// UDP port to listen on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        port: cli.port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };
    let config = Config::load(cli.config.as_deref(), overrides)?;
    config.validate()?;

    bootstrap::init_logging(&config);

    info!("Starting rootward v{}", env!("CARGO_PKG_VERSION"));

    let exchange = Arc::new(WireExchange::new(Duration::from_secs(
        config.resolver.query_timeout,
    )));
    let resolver = Arc::new(RecursiveResolver::new(
        exchange,
        config.resolver.max_recursion_depth,
    ));
    let handler = DnsServerHandler::new(resolver);

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    server::run_udp_server(&bind_addr, handler).await?;

    info!("Server shutdown complete");
    Ok(())
}
