use momo_relay::{Error, RelayConfig, Server, Upstream, relay};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RelayConfig::default();
    let upstream = Upstream::new(&config)?;
    tracing::info!(upstream = upstream.base(), timeout = ?config.upstream_timeout, "relaying");

    let server = Server::bind(config.listen).await?;
    server.serve(relay::router(upstream)).await;
    Ok(())
}
