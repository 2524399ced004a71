//! Console logging built on `tracing`.
//!
//! Progress lines, evaluation summaries and the final report all go through
//! `tracing` macros; the binary installs a compact fmt subscriber once at
//! startup.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Logging configuration for the binary.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level to display.
    pub level: Level,
    /// Whether to include the module path of each event.
    pub include_target: bool,
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            include_target: false,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// Builds a config from a level name ("trace", "debug", "info", "warn",
    /// "error"). Unknown names fall back to `info`.
    pub fn with_level_name(name: &str) -> Self {
        Self {
            level: parse_level(name),
            ..Self::default()
        }
    }
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(LogConfig::with_level_name("DEBUG").level, Level::DEBUG);
        assert_eq!(LogConfig::with_level_name("warning").level, Level::WARN);
        assert_eq!(LogConfig::with_level_name("bogus").level, Level::INFO);
    }
}
