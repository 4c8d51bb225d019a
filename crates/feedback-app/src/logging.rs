//! Tracing subscriber setup for the `feedback-form` binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const WORKSPACE_TARGETS: [&str; 5] = [
    "feedback_app",
    "feedback_capture",
    "feedback_files",
    "feedback_upload",
    "feedback_form",
];

/// Builds the fallback filter used when `RUST_LOG` is unset.
///
/// `verbose` forces `debug` for workspace crates regardless of `level`.
pub fn default_filter(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .chain(std::iter::once("warn".to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber writing to stderr.
///
/// # Errors
/// Fails when a global subscriber is already installed.
pub fn init(level: &str, verbose: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = default_filter(level, verbose);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_configured_level() {
        let filter = default_filter("warn", true);
        assert!(filter.contains("feedback_app=debug"));
        assert!(filter.ends_with(",warn"));
        assert!(filter.parse::<EnvFilter>().is_ok());
    }
}
