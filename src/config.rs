// Runtime configuration for the registry

use std::path::PathBuf;

pub const DEFAULT_STORE_PATH: &str = "hotels.json";
pub const DEFAULT_INDENT: usize = 4;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// Where the hotel document lives and how it is laid out on disk
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub path: PathBuf,
    // Spaces per nesting level; 0 writes compact single-line JSON
    pub indent: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            indent: DEFAULT_INDENT,
        }
    }
}

impl StoreConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(
            config,
            AppConfig {
                store: StoreConfig {
                    path: PathBuf::from("hotels.json"),
                    indent: 4,
                },
                log_level: "warn".to_string(),
            }
        );
    }

    #[test]
    fn test_with_path_keeps_default_indent() {
        let config = StoreConfig::with_path("/tmp/other.json");
        assert_eq!(config.path, PathBuf::from("/tmp/other.json"));
        assert_eq!(config.indent, DEFAULT_INDENT);
    }
}
