//! Pipeline configuration.

use std::path::PathBuf;

use srcdoc_config::Config;

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Start delimiter of documentation regions.
    pub start: String,
    /// End delimiter of documentation regions.
    pub end: String,
    /// Prefix code lines with running line numbers.
    pub numbered: bool,
    /// Render cache, `None` when caching is disabled.
    pub cache: Option<CacheSettings>,
    /// Renderer backend.
    pub backend: String,
    /// `name=value` attribute assignments, in order.
    pub attributes: Vec<String>,
    /// Options forwarded untouched to the renderer, in order.
    pub options: Vec<String>,
    /// Directory the renderer writes its output file into. Files a renderer
    /// places next to its output (e.g. generated images) end up here.
    pub work_dir: PathBuf,
}

/// Location and size ceiling of the render cache.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Cache root directory.
    pub dir: PathBuf,
    /// Total size ceiling in bytes.
    pub max_size: u64,
}

impl PipelineConfig {
    /// Build pipeline settings from a loaded [`Config`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let cache = config.cache_resolved.enabled.then(|| CacheSettings {
            dir: config.cache_resolved.dir.clone(),
            max_size: config.cache_resolved.max_size,
        });

        Self {
            start: config.extract.start.clone(),
            end: config.extract.end.clone(),
            numbered: config.extract.numbered,
            cache,
            backend: config.render.backend.clone(),
            attributes: config.render.attributes.clone(),
            options: config.render.options.clone(),
            work_dir: PathBuf::from("."),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.start, "/*");
        assert_eq!(config.end, "*/");
        assert!(!config.numbered);
        assert_eq!(config.backend, "html");
        assert_eq!(config.work_dir, PathBuf::from("."));
        let cache = config.cache.unwrap();
        assert_eq!(cache.max_size, srcdoc_config::DEFAULT_CACHE_SIZE);
    }

    #[test]
    fn test_disabled_cache_has_no_settings() {
        let mut config = Config::default();
        config.cache_resolved.enabled = false;

        assert!(PipelineConfig::from_config(&config).cache.is_none());
    }
}
