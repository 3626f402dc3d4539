use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bff::{api, auth, config, proxy, AppState};

/// Felanmälan BFF — authenticated proxy for the FAST2 property management API.
#[derive(Parser)]
#[command(name = "felanmalan", version)]
struct Cli {
    /// Port to listen on (overrides BFF_PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "bff=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();
    let cfg = config::load()?;
    let port = args.port.unwrap_or(cfg.port);

    let state = Arc::new(AppState {
        upstream: proxy::upstream::UpstreamClient::new(),
        caches: auth::cache::TokenCaches::default(),
        config: cfg,
    });

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("felanmälan BFF listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
