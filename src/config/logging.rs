//! Logging configuration and subscriber setup.

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Logging configuration (`LOGGING_` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Log level filter, e.g. "INFO" or "parcel_registry=debug".
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingSettings {
    /// Installs the global tracing subscriber for a binary.
    pub fn init(&self) {
        if !self.enabled {
            return;
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_lowercase()));

        if self.json {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            level: default_level(),
            json: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_level() -> String {
    "INFO".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = LoggingSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.level, "INFO");
        assert!(!settings.json);
    }
}
