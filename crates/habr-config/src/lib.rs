//! Configuration management for the Habrahabr converter.
//!
//! Parses `habr.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Expansion
//!
//! `images.base_dir` supports `~` and environment variable expansion:
//!
//! - `~/dir` - expands to a directory under `$HOME`
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! A relative `base_dir` is resolved against the directory of the config file.

mod expand;

use std::path::{Path, PathBuf};

use habr_renderer::{Container, HeadingShift, HighlightMode, PipelineOptions, UnknownLanguage};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override highlighting theme.
    pub theme: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "habr.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown parser configuration.
    pub markdown: MarkdownConfig,
    /// Heading shift configuration.
    pub headings: HeadingsConfig,
    /// Image relocation configuration (base directory as a raw string).
    images: ImagesConfigRaw,
    /// Code highlighting configuration.
    pub highlight: HighlightConfig,

    /// Resolved image configuration (set after loading).
    #[serde(skip)]
    pub images_resolved: ImagesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown parser configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Whether GFM tables are parsed.
    pub tables: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { tables: true }
    }
}

/// Heading shift configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HeadingsConfig {
    /// Shift table: `one-level` or `top-three`.
    pub shift: HeadingShift,
}

/// Raw image configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImagesConfigRaw {
    base_dir: Option<String>,
    external_prefixes: Option<Vec<String>>,
}

/// Resolved image configuration.
#[derive(Debug)]
pub struct ImagesConfig {
    /// Directory `<src>.address` side-files are read from.
    pub base_dir: PathBuf,
    /// Image sources with any of these prefixes are left untouched.
    pub external_prefixes: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            external_prefixes: vec!["http://".to_owned()],
        }
    }
}

/// Code highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// `inline` markup or platform-side `native` highlighting.
    pub mode: HighlightMode,
    /// Bundled syntect theme name.
    pub theme: String,
    /// Element wrapping inline-highlighted code.
    pub container: Container,
    /// Behavior for markers naming an unknown language.
    pub unknown_language: UnknownLanguage,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            mode: HighlightMode::default(),
            theme: "InspiredGitHub".to_owned(),
            container: Container::default(),
            unknown_language: UnknownLanguage::default(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`images.base_dir`").
        field: String,
        /// Error message (e.g., "${`IMAGES`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `habr.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(theme) = &settings.theme {
            self.highlight.theme.clone_from(theme);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_images(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand and resolve the raw image configuration.
    fn resolve_images(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let defaults = ImagesConfig::default();

        let base_dir = match &self.images.base_dir {
            Some(raw) => config_dir.join(expand::expand_path(raw, "images.base_dir")?),
            None => defaults.base_dir,
        };
        let external_prefixes = self
            .images
            .external_prefixes
            .clone()
            .unwrap_or(defaults.external_prefixes);

        self.images_resolved = ImagesConfig {
            base_dir,
            external_prefixes,
        };
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`] after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.highlight.theme, "highlight.theme")?;

        let prefixes = &self.images_resolved.external_prefixes;
        if prefixes.is_empty() {
            return Err(ConfigError::Validation(
                "images.external_prefixes must list at least one prefix".to_owned(),
            ));
        }
        for prefix in prefixes {
            require_non_empty(prefix, "images.external_prefixes entry")?;
        }

        Ok(())
    }

    /// Renderer pipeline options for this configuration.
    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            tables: self.markdown.tables,
            heading_shift: self.headings.shift,
            image_base_dir: self.images_resolved.base_dir.clone(),
            external_prefixes: self.images_resolved.external_prefixes.clone(),
            highlight_mode: self.highlight.mode,
            theme: self.highlight.theme.clone(),
            container: self.highlight.container,
            unknown_language: self.highlight.unknown_language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.markdown.tables);
        assert_eq!(config.headings.shift, HeadingShift::OneLevel);
        assert_eq!(config.images_resolved.base_dir, PathBuf::from("."));
        assert_eq!(config.images_resolved.external_prefixes, vec!["http://"]);
        assert_eq!(config.highlight.mode, HighlightMode::Inline);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.highlight.container, Container::Blockquote);
        assert_eq!(config.highlight.unknown_language, UnknownLanguage::Error);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.markdown.tables);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[markdown]
tables = false

[headings]
shift = "top-three"

[images]
base_dir = "media"
external_prefixes = ["http://", "https://"]

[highlight]
mode = "native"
theme = "Solarized (dark)"
container = "pre"
unknown_language = "plain"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_images(Path::new("/post")).unwrap();

        assert!(!config.markdown.tables);
        assert_eq!(config.headings.shift, HeadingShift::TopThree);
        assert_eq!(config.images_resolved.base_dir, PathBuf::from("/post/media"));
        assert_eq!(
            config.images_resolved.external_prefixes,
            vec!["http://", "https://"]
        );
        assert_eq!(config.highlight.mode, HighlightMode::Native);
        assert_eq!(config.highlight.theme, "Solarized (dark)");
        assert_eq!(config.highlight.container, Container::Pre);
        assert_eq!(config.highlight.unknown_language, UnknownLanguage::Plain);
    }

    #[test]
    fn test_parse_invalid_enum_value() {
        let toml = r#"
[headings]
shift = "two-levels"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_absolute_base_dir_kept() {
        let toml = r#"
[images]
base_dir = "/srv/images"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_images(Path::new("/post")).unwrap();
        assert_eq!(config.images_resolved.base_dir, PathBuf::from("/srv/images"));
    }

    #[test]
    fn test_base_dir_env_expansion() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("HABR_TEST_MEDIA", "/srv/media");
        }

        let toml = r#"
[images]
base_dir = "${HABR_TEST_MEDIA}/2024"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_images(Path::new("/post")).unwrap();
        assert_eq!(
            config.images_resolved.base_dir,
            PathBuf::from("/srv/media/2024")
        );

        unsafe {
            std::env::remove_var("HABR_TEST_MEDIA");
        }
    }

    #[test]
    fn test_validate_empty_theme() {
        let mut config = Config::default();
        config.highlight.theme = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("highlight.theme"));
    }

    #[test]
    fn test_validate_no_prefixes() {
        let mut config = Config::default();
        config.images_resolved.external_prefixes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_prefix() {
        let mut config = Config::default();
        config.images_resolved.external_prefixes.push(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("external_prefixes"));
    }

    #[test]
    fn test_apply_cli_settings_theme() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            theme: Some("base16-ocean.dark".to_owned()),
        });
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.highlight.theme, "InspiredGitHub");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[images]\nbase_dir = \"img\"\n\n[highlight]\ntheme = \"InspiredGitHub\"\n",
        )
        .unwrap();

        let cli = CliSettings {
            theme: Some("base16-mocha.dark".to_owned()),
        };
        let config = Config::load(Some(&path), Some(&cli)).unwrap();

        assert_eq!(config.config_path, Some(path.clone()));
        assert_eq!(config.images_resolved.base_dir, dir.path().join("img"));
        assert_eq!(config.highlight.theme, "base16-mocha.dark");
    }

    #[test]
    fn test_load_missing_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_rejects_empty_cli_theme() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habr.toml");
        std::fs::write(&path, "").unwrap();

        let cli = CliSettings {
            theme: Some(String::new()),
        };
        let result = Config::load(Some(&path), Some(&cli));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habr.toml");
        std::fs::write(&path, "[highlight\n").unwrap();

        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_pipeline_options() {
        let toml = r#"
[headings]
shift = "top-three"

[highlight]
mode = "native"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_images(Path::new("/post")).unwrap();

        let options = config.pipeline_options();
        assert_eq!(options.heading_shift, HeadingShift::TopThree);
        assert_eq!(options.highlight_mode, HighlightMode::Native);
        assert_eq!(options.image_base_dir, PathBuf::from("."));
        assert_eq!(options.external_prefixes, vec!["http://"]);
        assert!(options.tables);
    }
}
