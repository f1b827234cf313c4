//! Configuration management for srcdoc.
//!
//! Parses `srcdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [extract]
//! start = "#"
//! end = "#"
//! numbered = true
//!
//! [cache]
//! dir = "${XDG_CACHE_HOME:-/var/tmp}/srcdoc"
//! max_size = 52428800
//!
//! [render]
//! program = "asciidoctor"
//! backend = "html5"
//! attributes = ["toc", "icons=font"]
//! options = ["--no-header-footer"]
//! ```
//!
//! ## Expansion
//!
//! `cache.dir` and `render.program` expand a leading `~` and environment
//! variables:
//!
//! - `$VAR` / `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Scalar fields override only when set. List fields are appended after the
/// values from the configuration file.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override start delimiter.
    pub start: Option<String>,
    /// Override end delimiter.
    pub end: Option<String>,
    /// Override line numbering.
    pub numbered: Option<bool>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override cache directory (`~` is expanded).
    pub cache_dir: Option<String>,
    /// Override cache size ceiling in bytes.
    pub cache_size: Option<u64>,
    /// Override renderer program.
    pub program: Option<String>,
    /// Override renderer backend.
    pub backend: Option<String>,
    /// Additional `name=value` attributes.
    pub attributes: Vec<String>,
    /// Additional pass-through renderer options.
    pub options: Vec<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "srcdoc.toml";

/// Default cache directory, before `~` expansion.
const DEFAULT_CACHE_DIR: &str = "~/.srcdoc_cache";

/// Default cache size ceiling (10 MiB).
pub const DEFAULT_CACHE_SIZE: u64 = 10 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Documentation block extraction.
    pub extract: ExtractConfig,
    /// Cache configuration (paths are raw strings from TOML).
    cache: CacheConfigRaw,
    /// External renderer configuration.
    pub render: RenderConfig,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Documentation block extraction configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Start delimiter, matched literally.
    pub start: String,
    /// End delimiter, matched literally.
    pub end: String,
    /// Prefix code lines with running line numbers.
    pub numbered: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            start: "/*".to_owned(),
            end: "*/".to_owned(),
            numbered: false,
        }
    }
}

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
    max_size: Option<u64>,
}

/// Resolved cache configuration with an absolute directory.
#[derive(Debug)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Cache root directory.
    pub dir: PathBuf,
    /// Total size ceiling of cached entries, in bytes.
    pub max_size: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(shellexpand::tilde(DEFAULT_CACHE_DIR).into_owned()),
            max_size: DEFAULT_CACHE_SIZE,
        }
    }
}

/// External renderer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer program.
    pub program: String,
    /// Arguments placed before the generated ones.
    pub args: Vec<String>,
    /// Output backend.
    pub backend: String,
    /// `name=value` attribute assignments, in order.
    pub attributes: Vec<String>,
    /// Options forwarded untouched to the renderer, in order.
    pub options: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "asciidoc".to_owned(),
            args: Vec::new(),
            backend: "html".to_owned(),
            attributes: Vec::new(),
            options: Vec::new(),
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
        /// Config field path (e.g., "`cache.dir`").
        field: String,
        /// Error message (e.g., "${`CACHE_ROOT`} not set").
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
    /// Otherwise, searches for `srcdoc.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the final configuration is invalid.
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
            config.apply_cli_settings(settings)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(start) = &settings.start {
            self.extract.start.clone_from(start);
        }
        if let Some(end) = &settings.end {
            self.extract.end.clone_from(end);
        }
        if let Some(numbered) = settings.numbered {
            self.extract.numbered = numbered;
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.cache_resolved.dir = PathBuf::from(expand::expand(cache_dir, "--cache-dir")?);
        }
        if let Some(cache_size) = settings.cache_size {
            self.cache_resolved.max_size = cache_size;
        }
        if let Some(program) = &settings.program {
            self.render.program.clone_from(program);
        }
        if let Some(backend) = &settings.backend {
            self.render.backend.clone_from(backend);
        }
        self.render
            .attributes
            .extend(settings.attributes.iter().cloned());
        self.render.options.extend(settings.options.iter().cloned());
        Ok(())
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

        // Expand before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.extract.start, "extract.start")?;
        require_non_empty(&self.extract.end, "extract.end")?;
        require_non_empty(&self.render.program, "render.program")?;
        require_non_empty(&self.render.backend, "render.backend")?;

        for attribute in &self.render.attributes {
            if attribute.split('=').next().is_none_or(str::is_empty) {
                return Err(ConfigError::Validation(format!(
                    "render.attributes: '{attribute}' has no attribute name"
                )));
            }
        }

        Ok(())
    }

    /// Expand `~` and environment variable references.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.cache.dir {
            self.cache.dir = Some(expand::expand(dir, "cache.dir")?);
        }
        self.render.program = expand::expand(&self.render.program, "render.program")?;
        Ok(())
    }

    /// Resolve the cache directory against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = CacheConfig::default();
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(defaults.enabled),
            dir: self
                .cache
                .dir
                .as_deref()
                .map_or(defaults.dir, |dir| config_dir.join(dir)),
            max_size: self.cache.max_size.unwrap_or(defaults.max_size),
        };
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
        assert_eq!(config.extract.start, "/*");
        assert_eq!(config.extract.end, "*/");
        assert!(!config.extract.numbered);
        assert!(config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.max_size, 10 * 1024 * 1024);
        assert!(config.cache_resolved.dir.ends_with(".srcdoc_cache"));
        assert_eq!(config.render.program, "asciidoc");
        assert_eq!(config.render.backend, "html");
        assert!(config.render.attributes.is_empty());
        assert!(config.render.options.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.extract.start, "/*");
        assert_eq!(config.render.backend, "html");
    }

    #[test]
    fn test_parse_extract_config() {
        let toml = r##"
[extract]
start = "#"
end = "#"
numbered = true
"##;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.extract.start, "#");
        assert_eq!(config.extract.end, "#");
        assert!(config.extract.numbered);
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
program = "asciidoctor"
backend = "docbook"
attributes = ["toc", "icons=font"]
options = ["--no-header-footer"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.program, "asciidoctor");
        assert_eq!(config.render.backend, "docbook");
        assert_eq!(config.render.attributes, vec!["toc", "icons=font"]);
        assert_eq!(config.render.options, vec!["--no-header-footer"]);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[cache]
enabled = false
dir = "build/cache"
max_size = 4096
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert!(!config.cache_resolved.enabled);
        assert_eq!(
            config.cache_resolved.dir,
            PathBuf::from("/project/build/cache")
        );
        assert_eq!(config.cache_resolved.max_size, 4096);
    }

    #[test]
    fn test_resolve_paths_absolute_dir_kept() {
        let toml = r#"
[cache]
dir = "/var/cache/srcdoc"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.cache_resolved.dir, PathBuf::from("/var/cache/srcdoc"));
        assert_eq!(config.cache_resolved.max_size, DEFAULT_CACHE_SIZE);
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcdoc.toml");
        std::fs::write(
            &path,
            "[cache]\ndir = \"cache\"\n\n[render]\nbackend = \"xhtml11\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.cache_resolved.dir, tmp.path().join("cache"));
        assert_eq!(config.render.backend, "xhtml11");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/srcdoc.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcdoc.toml");
        std::fs::write(&path, "[extract\nstart = 1").unwrap();

        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_expands_cache_dir_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcdoc.toml");
        std::fs::write(
            &path,
            "[cache]\ndir = \"${SRCDOC_TEST_UNSET_CACHE_ROOT:-/opt/cache}/x\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.cache_resolved.dir, PathBuf::from("/opt/cache/x"));
    }

    #[test]
    fn test_load_missing_env_var() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcdoc.toml");
        std::fs::write(&path, "[render]\nprogram = \"${SRCDOC_TEST_UNSET_PROGRAM}\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("render.program"));
    }

    #[test]
    fn test_apply_cli_settings_scalars() {
        let mut config = Config::default();
        let settings = CliSettings {
            start: Some("<!--".to_owned()),
            end: Some("-->".to_owned()),
            numbered: Some(true),
            cache_enabled: Some(false),
            cache_dir: Some("/tmp/srcdoc".to_owned()),
            cache_size: Some(1024),
            program: Some("asciidoctor".to_owned()),
            backend: Some("docbook".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&settings).unwrap();

        assert_eq!(config.extract.start, "<!--");
        assert_eq!(config.extract.end, "-->");
        assert!(config.extract.numbered);
        assert!(!config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/tmp/srcdoc"));
        assert_eq!(config.cache_resolved.max_size, 1024);
        assert_eq!(config.render.program, "asciidoctor");
        assert_eq!(config.render.backend, "docbook");
    }

    #[test]
    fn test_apply_cli_settings_lists_append_in_order() {
        let mut config: Config = toml::from_str(
            "[render]\nattributes = [\"toc\"]\noptions = [\"--no-header-footer\"]\n",
        )
        .unwrap();
        let settings = CliSettings {
            attributes: vec!["icons=font".to_owned(), "b=2".to_owned()],
            options: vec!["-s".to_owned()],
            ..Default::default()
        };

        config.apply_cli_settings(&settings).unwrap();

        assert_eq!(config.render.attributes, vec!["toc", "icons=font", "b=2"]);
        assert_eq!(config.render.options, vec!["--no-header-footer", "-s"]);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default()).unwrap();

        assert_eq!(config.extract.start, "/*");
        assert!(config.cache_resolved.enabled);
        assert!(config.render.attributes.is_empty());
    }

    #[test]
    fn test_validate_empty_delimiter() {
        let mut config = Config::default();
        config.extract.end = String::new();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("extract.end"));
    }

    #[test]
    fn test_validate_empty_backend() {
        let mut config = Config::default();
        config.render.backend = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_attribute_without_name() {
        let mut config = Config::default();
        config.render.attributes = vec!["toc".to_owned(), "=value".to_owned()];

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("=value"));
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcdoc.toml");
        std::fs::write(&path, "").unwrap();
        let settings = CliSettings {
            start: Some(String::new()),
            ..Default::default()
        };

        let result = Config::load(Some(&path), Some(&settings));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
