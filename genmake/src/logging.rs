use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[clap(rename_all = "UPPER")]
#[serde(rename_all = "UPPERCASE")]
pub enum LevelFilter {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LevelFilter {
    fn into_tracing(self) -> tracing::level_filters::LevelFilter {
        match self {
            Self::Off => tracing::level_filters::LevelFilter::OFF,
            Self::Error => tracing::level_filters::LevelFilter::ERROR,
            Self::Warn => tracing::level_filters::LevelFilter::WARN,
            Self::Info => tracing::level_filters::LevelFilter::INFO,
            Self::Debug => tracing::level_filters::LevelFilter::DEBUG,
            Self::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

/// Configures tracing and sets up the logging facility.
///
/// Log messages share standard output with the rest of the diagnostics.
///
/// # Arguments
///
/// * `default` - The log level to use. If `None`, falls back to `RUST_LOG` in the environment.
/// * `verbose` - Raise the fallback level to `INFO`, so progress messages become visible.
pub fn setup_logging(default: Option<LevelFilter>, verbose: bool) {
    let filter = match default {
        Some(filter) => {
            // We have a level from the config or command line, ignore RUST_LOG.
            EnvFilter::builder()
                .with_default_directive(filter.into_tracing().into())
                .parse_lossy("")
        }
        None => {
            let fallback = if verbose {
                tracing::level_filters::LevelFilter::INFO
            } else {
                tracing::level_filters::LevelFilter::WARN
            };
            EnvFilter::builder()
                .with_default_directive(fallback.into())
                .from_env_lossy()
        }
    };

    tracing_subscriber::fmt()
        .compact()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stdout)
        .with_env_filter(filter)
        .init();
}
