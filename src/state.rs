use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::BotResult,
    messenger::ChatPlatform,
    platform::{MediaExtractor, YtDlp},
    runtime::{DeliveryOrchestrator, OrchestratorSettings, RuntimeManager},
    service::ServiceRegistry,
};

/// Everything the bot needs that does not depend on the messaging backend.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub runtime: RuntimeManager,
    pub service_registry: ServiceRegistry,
    pub extractor: Arc<dyn MediaExtractor>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> BotResult<Self> {
        tokio::fs::create_dir_all(&config.download.dir).await?;
        info!("Scratch directory: {}", config.download.dir.display());

        let extractor: Arc<dyn MediaExtractor> = Arc::new(YtDlp::from_config(&config.download));
        Ok(Self::with_extractor(config, extractor))
    }

    pub fn with_extractor(config: AppConfig, extractor: Arc<dyn MediaExtractor>) -> Self {
        let service_registry = ServiceRegistry::new(&config, extractor.clone());
        let runtime = RuntimeManager::new(&config, &service_registry);

        Self {
            config: Arc::new(config),
            runtime,
            service_registry,
            extractor,
        }
    }

    pub fn orchestrator(&self, platform: Arc<dyn ChatPlatform>) -> Arc<DeliveryOrchestrator> {
        Arc::new(DeliveryOrchestrator::new(
            platform,
            self.extractor.clone(),
            self.service_registry.clone(),
            OrchestratorSettings::from_config(&self.config),
        ))
    }
}
