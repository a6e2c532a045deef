use crate::config::StoreConfig;
use crate::services::remote_store::OpenHumansClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub fn setup_store(config: StoreConfig) -> Result<Arc<OpenHumansClient>> {
    info!("☁️  Remote store: {}", config.base_url);
    Ok(Arc::new(OpenHumansClient::new(config)?))
}
