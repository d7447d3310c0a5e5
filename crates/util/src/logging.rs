//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Default filter used when neither `RUST_LOG` nor a configured filter is present.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `filter`, which wins over [`DEFAULT_LOG_FILTER`].
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(filter: Option<&str>) {
    let directives = std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| filter.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.into());
    let env_filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialisation_is_harmless() {
        init_tracing(Some("debug"));
        init_tracing(Some("not a [valid filter"));
        tracing::debug!("still logging");
    }
}
