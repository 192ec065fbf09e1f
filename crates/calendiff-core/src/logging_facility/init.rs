//! Subscriber setup for the CLI and dashboard processes.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Where and how log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines on stderr, debug and up
    Development,
    /// One JSON object per line on stderr, info and up
    Production,
    /// Bare registry; tests install their own capture layer
    Test,
}

impl Profile {
    /// Profile selected by the `--log-json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Profile::Production
        } else {
            Profile::Development
        }
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "calendiff=debug,calendiff_core=debug",
            Profile::Production => "calendiff=info,calendiff_core=info",
            Profile::Test => "off",
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_filter()))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call in a process has any effect. Stdout is left to
/// command output.
///
/// # Example
///
/// ```
/// use calendiff_core::logging_facility::{init, Profile};
///
/// init(Profile::from_json_flag(false));
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(profile.env_filter())
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(profile.env_filter())
                .init();
        }
        Profile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}
