use rootward_domain::Config;
use tracing_subscriber::EnvFilter;

/// Initialises the tracing subscriber. `RUST_LOG` wins over the config
/// file's level; everything goes to standard error.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
