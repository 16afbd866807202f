use anyhow::anyhow;
use retrieval_ask_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Events go to stderr because stdout
/// carries the structured ask.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(level_filter(&config.level))
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new("warn"))
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::level_filter;

    #[test]
    fn configured_level_becomes_the_filter_ceiling() {
        assert_eq!(level_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(level_filter(" error ").max_level_hint(), Some(LevelFilter::ERROR));
    }
}
