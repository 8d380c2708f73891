//! Logging setup and secret masking

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::utils::error::{GatewayError, Result};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| GatewayError::config(format!("invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // A subscriber may already be installed by a test harness or embedding app
    if let Err(e) = installed {
        tracing::debug!("logging already initialized: {}", e);
    }
    Ok(())
}

/// Mask a credential for display, keeping at most the last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => String::new(),
        n if n <= 8 => "***".to_string(),
        n => format!("***{}", chars[n - 4..].iter().collect::<String>()),
    }
}
