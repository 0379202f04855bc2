use std::sync::Arc;

use anyhow::Context;
use simple_logger::SimpleLogger;

use zonestream_adapter_axum::server::{router, AppState};
use zonestream_adapter_axum::transport::HyperTransport;
use zonestream_core::AppConfig;

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("ZONESTREAM_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path))?;
            AppConfig::from_toml_str(&raw).map_err(anyhow::Error::msg)
        }
        Err(_) => Ok(AppConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    SimpleLogger::new().with_level(config.logging.level).init()?;

    let mut delivery = config.delivery_config();
    if let Ok(key) = std::env::var("ZONESTREAM_KEY") {
        if !key.is_empty() {
            delivery.key = Some(key);
        }
    }

    let state = Arc::new(AppState {
        transport: Arc::new(HyperTransport::new()),
        delivery,
    });

    let addr = std::env::var("ZONESTREAM_ADDR").unwrap_or_else(|_| "127.0.0.1:8787".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    log::info!("preview server listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
