use std::sync::Arc;

use shared::domain::Config;

/// Server configuration shared by every view-model of a session.
#[derive(Clone, Default)]
pub struct CurrentConfig {
    config: Arc<Config>,
}

impl CurrentConfig {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn get(&self) -> Config {
        Config::clone(&self.config)
    }
}
