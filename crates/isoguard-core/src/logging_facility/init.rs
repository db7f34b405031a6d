//! Logging initialization
//!
//! One global subscriber per process, chosen by [`Profile`]. Output always
//! goes to stderr so command output on stdout stays machine-readable.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset, human output
pub const DEVELOPMENT_FILTER: &str = "isoguard=debug";
/// Filter used when `RUST_LOG` is unset, JSON output
pub const PRODUCTION_FILTER: &str = "isoguard=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines at debug level
    Development,
    /// One JSON object per event at info level
    Production,
    /// Bare registry; capture is installed via `init_test_capture()`
    Test,
}

static INIT_ONCE: Once = Once::new();

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the subscriber for `profile`.
///
/// Only the first call in a process has an effect. If another subscriber is
/// already installed (a test harness, say) it is left in place.
///
/// # Example
///
/// ```
/// use isoguard_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter_or(DEVELOPMENT_FILTER))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter_or(PRODUCTION_FILTER))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        // A subscriber set elsewhere wins.
        drop(installed);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_across_profiles() {
        init(Profile::Test);
        init(Profile::Development);
        init(Profile::Production);
    }

    #[test]
    fn test_default_filters_target_workspace_crates() {
        assert!(DEVELOPMENT_FILTER.starts_with("isoguard="));
        assert!(PRODUCTION_FILTER.starts_with("isoguard="));
    }
}
