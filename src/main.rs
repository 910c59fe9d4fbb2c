use std::net::SocketAddr;

use qriosity::{make_router, run_app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
    let router = make_router();
    tracing::info!("Server started on {}", addr);
    match run_app(router, addr).await {
        Ok(_) => (),
        Err(error) => tracing::error!("Error: {}", error),
    }
}
