//! Structured logging for the Sesame shell
//!
//! One compact console layer behind an `EnvFilter`. Gate decisions, window
//! lifecycle and the startup session check all log through `tracing`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset: the shell's own crates at
/// debug (info in release), everything else at info (warn in release)
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "sesame_shell_lib=debug,sesame_shell=debug,info"
    } else {
        "sesame_shell_lib=info,sesame_shell=info,warn"
    }
}

/// Install the global subscriber. `RUST_LOG` overrides [`default_filter`].
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    // try_init so a second call (e.g. from an embedding host) is harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init();
}

/// Debug-level subscriber on the test writer; safe to call from every test
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_does_not_panic() {
        init_test();
    }

    #[test]
    fn test_default_filter_parses_and_names_the_shell() {
        let filter = default_filter();
        assert!(EnvFilter::try_new(filter).is_ok());
        assert!(filter.starts_with("sesame_shell_lib="));
        assert!(filter.contains("sesame_shell="));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_test();
        init();
    }
}
