use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use crate::settings;

const BOOTSTRAP_FILTER: &str = "info";

pub struct LogConfig {
    pub filter: String,
}

impl From<&settings::Log> for LogConfig {
    fn from(log: &settings::Log) -> Self {
        Self {
            filter: log.filter.clone(),
        }
    }
}

/// Global subscriber whose filter can be swapped once settings are loaded.
pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    /// Install the subscriber. `RUST_LOG` wins over the built-in default
    /// until `reload_from_config` runs.
    pub fn new_bootstrap() -> Self {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_FILTER));
        let (filter, reload_handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();

        Self { reload_handle }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let filter = EnvFilter::try_new(&config.filter)
            .map_err(|e| anyhow!("invalid log filter {:?}: {}", config.filter, e))?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}
