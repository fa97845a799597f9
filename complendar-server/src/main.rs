mod logging;
mod routes;
mod state;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use complendar_core::ComplendarConfig;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

const DEFAULT_PORT: u16 = 8000;

#[derive(Parser)]
#[command(name = "complendar-server")]
#[command(about = "Serve spreadsheet to calendar conversion over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    host: IpAddr,

    /// Config file to use instead of ~/.config/complendar/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = match &args.config {
        Some(path) => ComplendarConfig::load_from(path),
        None => ComplendarConfig::load(),
    }
    .context("Failed to load configuration")?;

    let state = AppState::new(config, std::env::temp_dir());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::convert::router())
        .with_state(state)
        .layer(cors);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    println!("🌐 Running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
