//! Post rendering: front-matter, then tags, then markdown

use anyhow::{Context, Result};
use std::path::Path;

use super::FrontMatter;
use crate::extend::{Extend, RenderData};

/// A rendered post
#[derive(Debug, Clone)]
pub struct Post {
    pub front_matter: FrontMatter,
    /// Rendered HTML
    pub content: String,
}

impl Post {
    /// Render a markdown source
    ///
    /// Tags are expanded before markdown runs, so tag output lands in the
    /// page as raw HTML.
    pub fn render(extend: &Extend, text: &str, path: Option<&Path>) -> Result<Self> {
        let (front_matter, body) = FrontMatter::parse(text)?;

        let expanded = extend
            .tag
            .process(body)
            .context("Failed to expand tags")?;

        let data = RenderData {
            text: &expanded,
            path,
        };
        let content = extend
            .renderer
            .render("md", &data)
            .context("Failed to render markdown")?;

        Ok(Self {
            front_matter,
            content,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.front_matter.title.as_deref()
    }
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "md" | "markdown"))
        .unwrap_or(false)
}
