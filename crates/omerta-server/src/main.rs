//! Binary entry point: bind and serve until killed.

use omerta_server::{Server, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr =
        std::env::var("OMERTA_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let server = Server::builder().bind(&addr).build().await?;
    tracing::info!(addr = %server.local_addr()?, "omerta server up");
    server.run().await
}
