//! Built-in site scripts

pub mod postcss;
pub mod procon;

use std::path::Path;

use crate::config::SiteConfig;
use crate::content::MarkdownRenderer;
use crate::extend::{Extend, TagOptions};

pub use postcss::PostcssRenderer;
pub use procon::ProCon;

/// Register the built-in tags and renderers
pub fn register(extend: &mut Extend, config: &SiteConfig, base_dir: &Path) {
    extend
        .tag
        .register(procon::NAME, procon::render, TagOptions::block());

    let markdown = MarkdownRenderer::with_options(
        &config.highlight.theme,
        config.highlight.enable,
        config.highlight.line_number,
    );
    extend.renderer.register("md", "html", markdown.clone());
    extend.renderer.register("markdown", "html", markdown);

    let postcss = PostcssRenderer::new(&config.postcss, base_dir);
    for ext in &config.postcss.extensions {
        extend.renderer.register(ext, "css", postcss.clone());
    }

    tracing::debug!(
        "Registered {} tags and {} renderers",
        extend.tag.len(),
        extend.renderer.len()
    );
}
