use std::sync::Arc;

use clap::Parser;
use db::{build_repository, Config, LibraryService};
use utils::logging::LogFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    utils::init_tracing("vectordb", &config.log_level, LogFormat::Pretty);

    let repository = build_repository(&config)?;
    let service = Arc::new(LibraryService::new(repository));
    let router = db::server::build_router(service);

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    tracing::info!(address = %config.socket_addr(), "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
