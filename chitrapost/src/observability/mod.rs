//! Logging
//!
//! Structured logging via `tracing`. Human-readable output during
//! development, JSON lines in production; `RUST_LOG` overrides the default
//! filter.

use crate::config::ObservabilitySettings;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub const fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,chitrapost=debug,tower_http=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use chitrapost::{config::ObservabilitySettings, observability};
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init(&ObservabilitySettings::default())?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
pub fn init(settings: &ObservabilitySettings) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));
    let registry = tracing_subscriber::registry().with(env_filter);

    if settings.json {
        registry.with(fmt::layer().json()).try_init()?;
    } else if cfg!(debug_assertions) {
        registry.with(fmt::layer().pretty()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter()).is_ok());
    }

    #[test]
    fn test_second_init_is_an_error() {
        let settings = ObservabilitySettings { json: true };
        // The first call may race another test; only the second is certain.
        let _ = init(&settings);
        assert!(init(&settings).is_err());
    }
}
