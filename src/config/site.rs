//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::DEFAULT_THEME;

/// Main site configuration
///
/// Only the keys the plugins read are typed; everything else in
/// `_config.yml` is kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    /// Glob patterns (relative to `source_dir`) copied without rendering
    #[serde(default)]
    pub skip_render: Vec<String>,

    // Writing
    pub render_drafts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Stylesheets
    #[serde(default)]
    pub postcss: PostcssConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Hexo".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            skip_render: Vec::new(),

            render_drafts: false,
            highlight: HighlightConfig::default(),

            postcss: PostcssConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    /// syntect theme name
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: true,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

/// External PostCSS invocation
///
/// The command reads the stylesheet on stdin and writes CSS to stdout. Any
/// `:from` in `args` becomes the source file path, or `from` when rendering
/// text that has no file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostcssConfig {
    pub command: String,
    pub args: Vec<String>,
    pub from: Option<String>,
    /// Source extensions rendered to `.css`
    pub extensions: Vec<String>,
}

impl Default for PostcssConfig {
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: vec!["postcss".to_string()],
            from: None,
            extensions: vec!["scss".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.source_dir, "source");
        assert_eq!(config.public_dir, "public");
        assert!(config.highlight.line_number);
        assert_eq!(config.postcss.command, "npx");
        assert_eq!(config.postcss.extensions, vec!["scss"]);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
public_dir: dist
skip_render:
  - "vendor/**"
highlight:
  line_number: false
postcss:
  command: postcss
  args: ["--config", "."]
  from: themes/cwj-theme/source/css/main.pcss
theme: cwj-theme
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.public_dir, "dist");
        assert_eq!(config.source_dir, "source");
        assert_eq!(config.skip_render, vec!["vendor/**"]);
        assert!(!config.highlight.line_number);
        assert!(config.highlight.enable);
        assert_eq!(config.postcss.command, "postcss");
        assert_eq!(config.postcss.args, vec!["--config", "."]);
        assert_eq!(config.postcss.extensions, vec!["scss"]);
        assert_eq!(
            config.postcss.from.as_deref(),
            Some("themes/cwj-theme/source/css/main.pcss")
        );
        assert_eq!(
            config.extra.get("theme").and_then(|v| v.as_str()),
            Some("cwj-theme")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SiteConfig::load(dir.path().join("_config.yml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
