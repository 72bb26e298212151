//! Application and API metadata settings.

use serde::Deserialize;

/// General application settings (`APP_` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// API version segment, e.g. "v1".
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl AppSettings {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            debug: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Service metadata (`META_` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct MetaSettings {
    #[serde(default = "default_title")]
    pub title_app: String,

    #[serde(default = "default_version")]
    pub version_app: String,

    #[serde(default = "default_description")]
    pub description_app: String,
}

impl Default for MetaSettings {
    fn default() -> Self {
        Self {
            title_app: default_title(),
            version_app: default_version(),
            description_app: default_description(),
        }
    }
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_title() -> String {
    "Parcel Registry".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_description() -> String {
    "Parcel registration service".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.api_version, "v1");
        assert!(!settings.debug);
        assert_eq!(settings.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn meta_defaults() {
        let settings = MetaSettings::default();
        assert_eq!(settings.title_app, "Parcel Registry");
        assert_eq!(settings.version_app, "1.0.0");
    }
}
