use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use rm_gateway::config::GatewayConfig;
use rm_gateway::http::router;
use rm_gateway::schema::build_schema;
use rm_gateway::telemetry::{self, LogStyle};
use rm_gateway::{Gateway, Result};

const DEFAULT_LISTEN_ADDRESS: ([u8; 4], u16) = ([127, 0, 0, 1], 8080);

/// REST and GraphQL gateway for users and roles
#[derive(Debug, Parser)]
#[command(name = "rm-gateway", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short, env = "GATEWAY_CONFIG_PATH", default_value = "./gateway.toml")]
    config: PathBuf,
    /// Environment table to use from the configuration file
    #[arg(long, short, env = "GATEWAY_ENVIRONMENT", default_value = "dev")]
    environment: String,
    /// Address to listen on; overrides the configuration file
    #[arg(short, long, env = "GATEWAY_LISTEN_ADDRESS")]
    listen_address: Option<SocketAddr>,
    /// Log filter in RUST_LOG syntax
    #[arg(long = "log", env = "GATEWAY_LOG")]
    log_filter: Option<String>,
    /// Style of log output
    #[arg(long, env = "GATEWAY_LOG_STYLE", value_enum, default_value_t = LogStyle::Text)]
    log_style: LogStyle,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init(args.log_style, args.log_filter.as_deref());

    let config = GatewayConfig::load(&args.config)?;
    let settings = config.select(&args.environment)?;
    let gateway = Gateway::from_settings(settings)?;

    let listen_address = args
        .listen_address
        .or(config.listen_address)
        .unwrap_or_else(|| SocketAddr::from(DEFAULT_LISTEN_ADDRESS));

    let app = router(gateway.clone(), build_schema(gateway));
    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    info!(environment = %args.environment, %listen_address, "rm-gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}
