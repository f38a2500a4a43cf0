use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Theme {
    #[serde(default)]
    pub colors: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConfigError {
    pub message: String,
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|err| ConfigError {
        message: format!("failed to read config {}: {}", path.display(), err),
    })?;
    toml::from_str(&text).map_err(|err| ConfigError {
        message: format!("failed to parse config {}: {}", path.display(), err),
    })
}

#[cfg(test)]
mod tests {
    use super::{Config, load};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn defaults_when_empty() {
        let path = temp_path("prefixwind_config_default");
        let _ = fs::write(&path, "");
        let config = load(&path).expect("config should parse");
        assert!(config.theme.colors.is_empty());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn loads_theme_colors() {
        let path = temp_path("prefixwind_config_colors");
        let _ = fs::write(
            &path,
            r##"
[theme.colors.gray]
100 = "#f3f4f6"
500 = "#6b7280"

[theme.colors.brand]
500 = "#3b82f6"
"##,
        );
        let config = load(&path).expect("config should parse");
        assert_eq!(config.theme.colors["gray"]["100"], "#f3f4f6");
        assert_eq!(config.theme.colors["gray"]["500"], "#6b7280");
        assert_eq!(config.theme.colors["brand"]["500"], "#3b82f6");
    }

    #[test]
    fn reports_parse_failures() {
        let path = temp_path("prefixwind_config_invalid");
        let _ = fs::write(&path, "theme = [not toml");
        let err = load(&path).expect_err("config should fail to parse");
        assert!(err.message.contains("failed to parse config"));
    }

    fn temp_path(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}.toml", prefix, nanos))
    }
}
