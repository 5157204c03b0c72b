//! Generate static files

use anyhow::{bail, Context, Result};
use glob::Pattern;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::content::{is_markdown_file, Post};
use crate::extend::Extend;
use crate::Hexo;

/// What happens to a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Front-matter, tags, markdown
    Post,
    /// Registered renderer for the extension
    Render,
    /// Copied verbatim
    Copy,
}

#[derive(Debug, Clone)]
struct Job {
    source: PathBuf,
    /// Path relative to the source directory
    relative: PathBuf,
    action: Action,
}

/// Result of processing one file
#[derive(Debug)]
enum Outcome {
    Written(PathBuf),
    Unpublished,
}

/// Summary of a generate run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub rendered: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Generate the static site
pub async fn run(hexo: &Hexo) -> Result<()> {
    let start = Instant::now();
    let stats = generate(hexo).await?;

    tracing::info!(
        "Generated {} files, copied {}, skipped {} in {:.2}s",
        stats.rendered,
        stats.copied,
        stats.skipped,
        start.elapsed().as_secs_f64()
    );

    if stats.failed > 0 {
        bail!("{} file(s) failed to render", stats.failed);
    }

    Ok(())
}

/// Render every source file into the public directory
///
/// Files render concurrently on the blocking pool. A failing file is logged
/// and counted; the rest of the site is still written.
pub async fn generate(hexo: &Hexo) -> Result<Stats> {
    if !hexo.source_dir.is_dir() {
        bail!("Source directory {:?} does not exist", hexo.source_dir);
    }

    let skip_render = compile_patterns(&hexo.config.skip_render)?;
    let jobs = collect_jobs(hexo, &skip_render);
    tracing::info!("Found {} source files", jobs.len());

    fs::create_dir_all(&hexo.public_dir)?;

    let mut tasks = JoinSet::new();
    for job in jobs {
        let extend = Arc::clone(&hexo.extend);
        let public_dir = hexo.public_dir.clone();
        let render_drafts = hexo.config.render_drafts;
        tasks.spawn_blocking(move || {
            let result = process(&extend, &public_dir, &job, render_drafts);
            (job, result)
        });
    }

    let mut stats = Stats::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((job, Ok(Outcome::Written(target)))) => {
                tracing::debug!("{:?} -> {:?}", job.relative, target);
                match job.action {
                    Action::Copy => stats.copied += 1,
                    Action::Post | Action::Render => stats.rendered += 1,
                }
            }
            Ok((job, Ok(Outcome::Unpublished))) => {
                tracing::debug!("Skipping unpublished {:?}", job.relative);
                stats.skipped += 1;
            }
            Ok((job, Err(e))) => {
                tracing::error!("Failed to generate {:?}: {:#}", job.relative, e);
                stats.failed += 1;
            }
            Err(e) => {
                tracing::error!("Render task failed: {}", e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid skip_render pattern: {}", p)))
        .collect()
}

/// Walk the source directory and decide what to do with each file
fn collect_jobs(hexo: &Hexo, skip_render: &[Pattern]) -> Vec<Job> {
    let render_drafts = hexo.config.render_drafts;

    WalkDir::new(&hexo.source_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !name.starts_with('.')
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|entry| {
            let source = entry.into_path();
            let relative = source.strip_prefix(&hexo.source_dir).ok()?.to_path_buf();

            if is_private(&relative, render_drafts) {
                return None;
            }

            let action = if skip_render.iter().any(|p| p.matches_path(&relative)) {
                Action::Copy
            } else if is_markdown_file(&relative) {
                Action::Post
            } else if hexo.extend.renderer.is_renderable(&relative) {
                Action::Render
            } else {
                Action::Copy
            };

            Some(Job {
                source,
                relative,
                action,
            })
        })
        .collect()
}

/// `_`-prefixed names are private at any depth (Sass partials, `_data`),
/// except a leading `_posts` (and `_drafts` on request)
fn is_private(relative: &Path, render_drafts: bool) -> bool {
    relative.components().enumerate().any(|(i, component)| {
        let Component::Normal(name) = component else {
            return false;
        };
        let name = name.to_string_lossy();
        let allowed = i == 0 && (name == "_posts" || (render_drafts && name == "_drafts"));
        name.starts_with('_') && !allowed
    })
}

fn process(extend: &Extend, public_dir: &Path, job: &Job, render_drafts: bool) -> Result<Outcome> {
    let target = match job.action {
        Action::Copy => {
            let target = public_dir.join(&job.relative);
            write_parent(&target)?;
            fs::copy(&job.source, &target)?;
            return Ok(Outcome::Written(target));
        }
        Action::Post => public_dir.join(post_path(&job.relative)),
        Action::Render => {
            let output = extend
                .renderer
                .output_extension(&job.relative)
                .unwrap_or("html");
            public_dir.join(job.relative.with_extension(output))
        }
    };

    let text = fs::read_to_string(&job.source)
        .with_context(|| format!("Failed to read {:?}", job.source))?;

    let rendered = if job.action == Action::Post {
        let post = Post::render(extend, &text, Some(job.source.as_path()))?;
        if !post.front_matter.published && !render_drafts {
            return Ok(Outcome::Unpublished);
        }
        post.content
    } else {
        extend.renderer.render_file(&job.source, &text)?
    };

    write_parent(&target)?;
    fs::write(&target, rendered)?;
    Ok(Outcome::Written(target))
}

/// `_posts/2024/hello.md` -> `2024/hello.html`
fn post_path(relative: &Path) -> PathBuf {
    let mut components = relative.components();
    let stripped = match components.clone().next() {
        Some(Component::Normal(first)) if first == "_posts" || first == "_drafts" => {
            components.next();
            components.as_path()
        }
        _ => relative,
    };
    stripped.with_extension("html")
}

fn write_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Regenerate whenever the source directory changes
pub async fn watch(hexo: &Hexo) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            let _ = tx.send(res);
        },
    )?;
    debouncer
        .watcher()
        .watch(&hexo.source_dir, RecursiveMode::Recursive)?;

    tracing::info!("Watching {:?}. Press Ctrl+C to stop.", hexo.source_dir);

    while let Some(res) = rx.recv().await {
        match res {
            Ok(events) => {
                tracing::info!("{} path(s) changed, regenerating...", events.len());
                if let Err(e) = run(hexo).await {
                    tracing::error!("Generation failed: {:#}", e);
                }
            }
            Err(e) => tracing::warn!("Watch error: {:?}", e),
        }
    }

    Ok(())
}
