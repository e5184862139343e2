use anyhow::Result;
use axum::Router;
use clap::Parser;
use reco_core::RecommenderConfig;
use reco_server::{build_app, AppConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Catalog path (products.json file or a directory of them)
    #[arg(long, default_value = "./products.json")]
    catalog: PathBuf,
    /// Known users file
    #[arg(long, default_value = "./users.json")]
    users: PathBuf,
    /// Interaction history database directory
    #[arg(long, default_value = "./history.db")]
    history_db: PathBuf,
    /// Number of recommendations per page (1-10)
    #[arg(long, default_value_t = 10)]
    top_k: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = AppConfig {
        catalog: args.catalog,
        users: args.users,
        history_db: args.history_db,
        recommender: RecommenderConfig::with_top_k(args.top_k),
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
