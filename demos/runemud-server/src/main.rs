use runemud::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------
//
// Usage: runemud-server [config.json]
//
// RUNEMUD_BIND overrides the bind address from the config.

#[tokio::main]
async fn main() -> Result<(), RunemudError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_path(path)?,
        None => ServerConfig::default(),
    };
    if let Ok(addr) = std::env::var("RUNEMUD_BIND") {
        config.bind_addr = addr;
    }

    let server = RunemudServer::builder().config(config).build().await?;
    let addr = server.local_addr();
    eprintln!("runemud listening; connect with: telnet {} {}", addr.ip(), addr.port());

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await;
    Ok(())
}
