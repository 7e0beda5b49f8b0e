//! Tracing initialization

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over [`SdkConfig::log_level`]. Records of the `log`
/// facade emitted by the parser and compiler are forwarded to the same
/// subscriber. Does nothing when tracing is disabled.
pub fn init_tracing(config: &SdkConfig) -> Result<()> {
    if !config.enable_tracing {
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(&config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| SdkError::TracingError(e.to_string()))?;

    Ok(())
}

fn default_filter(level: &str) -> String {
    ["promptbook_sdk", "promptbook_compiler", "promptbook_parser", "promptbook_core"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}
