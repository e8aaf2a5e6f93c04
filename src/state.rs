use std::sync::Arc;

use crate::config::Config;
use crate::lookup::DictionaryService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service: Arc<DictionaryService>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        let service = DictionaryService::from_config(&config, http_client);

        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }

    /// State around an already-built service, e.g. one wired to test doubles.
    pub fn with_service(config: Config, service: DictionaryService) -> Self {
        Self {
            config,
            service: Arc::new(service),
        }
    }
}
