use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How parsed messages are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Html,
    Json,
}

/// Options read from `--config`. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub verbose: bool,
    /// URL scheme of the editor that opens source links.
    pub link_scheme: String,
    pub format: Format,
    /// Where to remember which files carry gutter marks.
    pub marks_cache: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbose: false,
            link_scheme: "txmt".to_string(),
            format: Format::Html,
            marks_cache: None,
        }
    }
}

impl Settings {
    pub fn load_from_path(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<Settings>(&content) {
                    Ok(settings) => {
                        log::info!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => log::warn!("Failed to parse settings: {}", e),
                },
                Err(e) => log::warn!("Failed to read settings: {}", e),
            }
        } else {
            log::warn!("Settings file {:?} not found, using defaults", path);
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "format": "json" }"#).unwrap();
        assert_eq!(settings.format, Format::Json);
        assert_eq!(settings.link_scheme, "txmt");
        assert!(!settings.verbose);
    }

    #[test]
    fn test_load_settings() {
        let temp_dir = std::env::temp_dir().join(format!("texrun-settings-{}", std::process::id()));
        std::fs::create_dir_all(&temp_dir).unwrap();

        let file = temp_dir.join("texrun.json");
        std::fs::write(&file, r#"{ "verbose": true, "link_scheme": "mvim" }"#).unwrap();
        let loaded = Settings::load_from_path(&file);
        assert!(loaded.verbose);
        assert_eq!(loaded.link_scheme, "mvim");

        let invalid = temp_dir.join("invalid.json");
        std::fs::write(&invalid, "{ invalid }").unwrap();
        assert_eq!(Settings::load_from_path(&invalid), Settings::default());

        assert_eq!(
            Settings::load_from_path(&temp_dir.join("missing.json")),
            Settings::default()
        );
        std::fs::remove_dir_all(&temp_dir).unwrap();
    }
}
