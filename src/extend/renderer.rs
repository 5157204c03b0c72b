//! Renderer plugins - map a source extension to a text transform

use indexmap::IndexMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by renderers
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No renderer registered for `.{0}`")]
    NoRenderer(String),

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input handed to a renderer
#[derive(Debug, Clone, Copy)]
pub struct RenderData<'a> {
    /// Source text
    pub text: &'a str,
    /// Source file, when rendering from disk
    pub path: Option<&'a Path>,
}

impl<'a> RenderData<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, path: None }
    }

    pub fn with_path(text: &'a str, path: &'a Path) -> Self {
        Self {
            text,
            path: Some(path),
        }
    }
}

/// A source-to-output transform
pub trait Renderer: Send + Sync {
    fn render(&self, data: &RenderData<'_>) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&RenderData<'_>) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, data: &RenderData<'_>) -> Result<String, RenderError> {
        self(data)
    }
}

#[derive(Clone)]
struct RendererEntry {
    output: String,
    renderer: Arc<dyn Renderer>,
}

/// Maps source extensions (without the dot, lowercase) to renderers
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: IndexMap<String, RendererEntry>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer` for `.ext` files producing `.output` files
    pub fn register<R>(&mut self, ext: &str, output: &str, renderer: R)
    where
        R: Renderer + 'static,
    {
        let ext = normalize(ext);
        let output = normalize(output);
        tracing::debug!("Registered renderer: {} -> {}", ext, output);
        self.renderers.insert(
            ext,
            RendererEntry {
                output,
                renderer: Arc::new(renderer),
            },
        );
    }

    pub fn get(&self, ext: &str) -> Option<&dyn Renderer> {
        self.renderers
            .get(&normalize(ext))
            .map(|entry| entry.renderer.as_ref())
    }

    /// Output extension for a source extension
    pub fn output_of(&self, ext: &str) -> Option<&str> {
        self.renderers
            .get(&normalize(ext))
            .map(|entry| entry.output.as_str())
    }

    pub fn is_renderable(&self, path: &Path) -> bool {
        extension(path).is_some_and(|ext| self.renderers.contains_key(&ext))
    }

    /// Output extension for a source file, if it is renderable
    pub fn output_extension(&self, path: &Path) -> Option<&str> {
        self.output_of(&extension(path)?)
    }

    /// Render `data` with the renderer registered for `ext`
    pub fn render(&self, ext: &str, data: &RenderData<'_>) -> Result<String, RenderError> {
        let renderer = self
            .get(ext)
            .ok_or_else(|| RenderError::NoRenderer(normalize(ext)))?;
        renderer.render(data)
    }

    /// Render a file's text, picking the renderer from its extension
    pub fn render_file(&self, path: &Path, text: &str) -> Result<String, RenderError> {
        let ext = extension(path).unwrap_or_default();
        self.render(&ext, &RenderData::with_path(text, path))
    }

    /// Registered `(source, output)` extension pairs, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renderers
            .iter()
            .map(|(ext, entry)| (ext.as_str(), entry.output.as_str()))
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
