//! Render a single source file

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::content::{is_markdown_file, Post};
use crate::extend::Extend;
use crate::Hexo;

/// Render `file` and write the result to `output`, or stdout
pub fn run(hexo: &Hexo, file: &Path, output: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?;
    let rendered = render_source(&hexo.extend, file, &text)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            tracing::info!("Rendered {:?} -> {:?}", file, path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Render source text according to the file's extension
///
/// Markdown goes through the post pipeline (front-matter, tags, markdown);
/// other extensions go straight to their registered renderer.
pub fn render_source(extend: &Extend, path: &Path, text: &str) -> Result<String> {
    if is_markdown_file(path) {
        let post = Post::render(extend, text, Some(path))
            .with_context(|| format!("Failed to render {:?}", path))?;
        return Ok(post.content);
    }

    if !extend.renderer.is_renderable(path) {
        bail!("No renderer registered for {:?}", path);
    }

    extend
        .renderer
        .render_file(path, text)
        .with_context(|| format!("Failed to render {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let hexo = Hexo::new(dir.path()).unwrap();
        let source = dir.path().join("review.md");
        fs::write(&source, "{% procon %}\n+ Quick\n- Loud\n{% endprocon %}\n").unwrap();

        let out = dir.path().join("out/review.html");
        run(&hexo, &source, Some(&out)).unwrap();

        let html = fs::read_to_string(out).unwrap();
        assert!(html.contains("<li>Quick</li>"));
        assert!(html.contains("<li>Loud</li>"));
    }

    #[test]
    fn test_unrenderable_file() {
        let dir = tempfile::tempdir().unwrap();
        let hexo = Hexo::new(dir.path()).unwrap();
        let err = render_source(&hexo.extend, Path::new("logo.png"), "").unwrap_err();
        assert!(err.to_string().contains("No renderer registered"));
    }
}
