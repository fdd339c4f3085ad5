use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use kindled_core::Error;

mod context;
mod routes;
mod server;

use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "kindled-server")]
#[command(author, version, about = "Kindled - daily-batch dating backend")]
pub struct Args {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Address the REST API listens on.
    #[arg(long, env = "KINDLED_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let ctx = ServerContext::new(&args).await?;
    let app = server::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&args.bind_addr).await?;
    info!("kindled-server listening on {}", args.bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {}", e);
    }

    info!("kindled-server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
    }
}
