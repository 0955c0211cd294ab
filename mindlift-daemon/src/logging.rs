//! Log output
//!
//! Human-readable lines on stderr; stdin and stdout stay free for the
//! operator console. `RUST_LOG` selects the filter, `--log-level` overrides
//! it, and the fallback is `info`.

use std::io::IsTerminal;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Default filter when neither `RUST_LOG` nor an override is given
pub const DEFAULT_FILTER: &str = "info";

/// Errors emitted when configuring the tracing subscriber
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("tracing has already been initialised: {0}")]
    AlreadyInitialised(#[from] TryInitError),
}

/// Build the filter from an explicit level, `RUST_LOG`, or the default
pub fn filter(level: Option<&str>) -> Result<EnvFilter, InitError> {
    match level {
        Some(level) => Ok(EnvFilter::try_new(level)?),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Configure the global tracing subscriber
pub fn init(level: Option<&str>) -> Result<(), InitError> {
    let filter = filter(level)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_wins() {
        let filter = filter(Some("debug")).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_per_target_directives() {
        let filter = filter(Some("warn,mindlift_daemon=trace")).unwrap();
        assert!(filter.to_string().contains("mindlift_daemon=trace"));
    }

    #[test]
    fn test_bad_directive_is_rejected() {
        assert!(matches!(
            filter(Some("mindlift=loud")),
            Err(InitError::Filter(_))
        ));
    }
}
