use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax, e.g.
/// `"ember_engine=debug,wgpu_core=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// The GPU stack logs shader translation and resource churn at `info`.
const NOISY_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

const DEFAULT_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Picks the filter directive: explicit config, then `RUST_LOG`, then the default.
fn resolve_filter(config: Option<String>, env: Option<String>) -> String {
    config.or(env).unwrap_or_else(|| {
        let mut filter = DEFAULT_FILTER.to_owned();
        for module in NOISY_MODULES {
            filter.push_str(&format!(",{module}=warn"));
        }
        filter
    })
}

/// Installs the global logger. Only the first call has any effect.
///
/// A logger installed beforehand (e.g. by a test harness) is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(config.env_filter, std::env::var("RUST_LOG").ok());

        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .try_init();

        if installed.is_ok() {
            log::debug!("logging initialized with `{filter}`");
        }
    });
}
