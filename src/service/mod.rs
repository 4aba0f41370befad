use std::sync::Arc;

use crate::{config::AppConfig, platform::MediaExtractor};

mod catalog;
mod ratelimit;
mod selection;

pub use catalog::*;
pub use ratelimit::*;
pub use selection::*;

#[derive(Clone)]
pub struct ServiceRegistry {
    pub ratelimit: RateLimitService,
    pub selection: SelectionService,
    pub catalog: CatalogService,
}

impl ServiceRegistry {
    pub fn new(config: &AppConfig, extractor: Arc<dyn MediaExtractor>) -> Self {
        info!("Initializing service registry");

        let ratelimit = RateLimitService::new(config.rate_limit.cooldown_minutes);
        let selection = SelectionService::new();
        let catalog = CatalogService::new(extractor);

        info!("Service registry initialized");

        Self {
            ratelimit,
            selection,
            catalog,
        }
    }
}
