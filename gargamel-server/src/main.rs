//! Entry point for the Dota 2 lobby manager: parse CLI args, load config,
//! initialize tracing, and run the HTTP control plane.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gargamel_gc::FakeGcClientFactory;

use gargamel_server::cli::{LogFormat, ServerCli};
use gargamel_server::config::Config;
use gargamel_server::control::{self, AppState};
use gargamel_server::session::state::TimingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = ServerCli::parse();

    let mut cfg = Config::load_or_create(&cli.config)
        .with_context(|| format!("loading or creating config '{}'", cli.config.display()))?;
    if let Some(port) = cli.port {
        cfg.port = port;
    }

    init_tracing(cli.log_format);

    let port = cfg.port_with_env_override();
    let timing = TimingConfig::from(&cfg);

    // The real Steam-client/Dota-protocol libraries this service drives are
    // an external capability this workspace does not vendor; production
    // deployments swap in their own `GcClientFactory` here.
    let gc_factory = Arc::new(FakeGcClientFactory::default());
    let state = AppState::new(gc_factory, timing);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(port, "starting gargamel-server");
    control::run::run_server(addr, state).await
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match format {
        LogFormat::Text => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .json()
                .init();
        }
    }
}
