// src/logging.rs

//! Logging setup: `tracing` events rendered by `tracing-subscriber` on stderr
//! (stdout carries `--dry-run` output).
//!
//! Filter, first match wins:
//! 1. `--log-level`
//! 2. `ASSETFLOW_LOG`, either a level (`debug`) or full filter directives
//!    (`assetflow::graph=trace,info`)
//! 3. `info`

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "ASSETFLOW_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let (filter, rejected) = resolve_filter(cli_level, env_value.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    if let Some(value) = rejected {
        tracing::warn!(value = %value, "ignoring invalid {LOG_ENV_VAR}; using `{DEFAULT_DIRECTIVE}`");
    }
    Ok(())
}

/// Pick the filter; also returns the environment value when it was present
/// but unusable.
fn resolve_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(level) = cli_level {
        return (EnvFilter::new(level_directive(level)), None);
    }
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => match EnvFilter::try_new(normalize_directive(value)) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVE), Some(value.to_string())),
        },
        None => (EnvFilter::new(DEFAULT_DIRECTIVE), None),
    }
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// Lowercase bare levels and accept `warning` for `warn`; directives pass
/// through unchanged.
fn normalize_directive(value: &str) -> String {
    match value.to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        lower @ ("error" | "warn" | "info" | "debug" | "trace" | "off") => lower.to_string(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(cli: Option<LogLevel>, env: Option<&str>) -> (String, bool) {
        let (filter, rejected) = resolve_filter(cli, env);
        (filter.to_string().to_lowercase(), rejected.is_some())
    }

    #[test]
    fn cli_flag_wins_over_env() {
        assert_eq!(rendered(Some(LogLevel::Trace), Some("error")), ("trace".into(), false));
    }

    #[test]
    fn env_accepts_levels_and_directives() {
        assert_eq!(rendered(None, Some(" Warning ")), ("warn".into(), false));
        assert_eq!(rendered(None, Some("DEBUG")), ("debug".into(), false));
        let (filter, rejected) = rendered(None, Some("assetflow::graph=trace,info"));
        assert!(!rejected);
        assert!(filter.contains("assetflow::graph=trace"));
    }

    #[test]
    fn missing_or_invalid_env_falls_back_to_info() {
        assert_eq!(rendered(None, None), ("info".into(), false));
        assert_eq!(rendered(None, Some("  ")), ("info".into(), false));
        assert_eq!(rendered(None, Some("assetflow=loud")), ("info".into(), true));
    }
}
