//! Extension points - tag and renderer registries
//!
//! An [`Extend`] is filled once while the site is set up and then shared
//! read-only (usually behind an `Arc`) by everything that renders content.

mod renderer;
mod tag;

pub use renderer::{RenderData, RenderError, Renderer, RendererRegistry};
pub use tag::{split_args, TagError, TagHandler, TagOptions, TagRegistry};

/// All registered extensions
#[derive(Debug, Clone, Default)]
pub struct Extend {
    /// Tag plugins, keyed by tag name
    pub tag: TagRegistry,
    /// Renderers, keyed by source extension
    pub renderer: RendererRegistry,
}

impl Extend {
    pub fn new() -> Self {
        Self::default()
    }
}
