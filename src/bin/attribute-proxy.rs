use anyhow::Result;
use attribute_proxy::cache::store::build_store;
use attribute_proxy::gateway::attributes::AttributeGateway;
use attribute_proxy::server::server::{self, AppState};
use attribute_proxy::utils::config_loader;
use attribute_proxy::utils::logging::{self, LogLevel};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "attribute-proxy.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args, load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // upstream secrets are checked per request; only warn here
    if let Err(e) = service_config.upstream.resolve() {
        warn!("{}; /attributes will answer 500 until configured", e);
    }

    // -------------------------------
    // 2. Token cache backend
    // -------------------------------

    let store = build_store(&service_config.settings.cache)?;

    // -------------------------------
    // 3. Attribute gateway + http server
    // -------------------------------

    let gateway = AttributeGateway::new(&service_config, store)?;
    let state = AppState::new(gateway, &service_config.settings.environment).await;

    info!("Service starting...");
    server::start(&service_config.settings, state).await
}
