//! hexo-plugins: tag plugins and renderers for Hexo-style sites
//!
//! The crate bundles a small tag system (`{% name %}...{% endname %}` blocks
//! expanded by registered handlers), a renderer registry keyed by file
//! extension, and the built-in site scripts that hang off them: the
//! `procon` list tag, a markdown renderer and a PostCSS stylesheet renderer.

pub mod commands;
pub mod config;
pub mod content;
pub mod extend;
pub mod plugins;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use extend::Extend;

/// The main Hexo application
#[derive(Debug, Clone)]
pub struct Hexo {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Registered tags and renderers, read-only once built
    pub extend: Arc<Extend>,
}

impl Hexo {
    /// Create a new Hexo instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        let mut extend = Extend::new();
        plugins::register(&mut extend, &config, &base_dir);

        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
            extend: Arc::new(extend),
        }
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let hexo = Hexo::new(dir.path()).unwrap();
        assert_eq!(hexo.source_dir, dir.path().join("source"));
        assert_eq!(hexo.public_dir, dir.path().join("public"));
        assert!(hexo.extend.tag.contains("procon"));
    }

    #[test]
    fn test_new_with_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "source_dir: src\npublic_dir: dist\npostcss:\n  extensions: [pcss]\n",
        )
        .unwrap();

        let hexo = Hexo::new(dir.path()).unwrap();
        assert_eq!(hexo.source_dir, dir.path().join("src"));
        assert_eq!(hexo.public_dir, dir.path().join("dist"));
        assert_eq!(hexo.extend.renderer.output_of("pcss"), Some("css"));
        assert!(hexo.extend.renderer.get("scss").is_none());
    }
}
