//! Stylesheet renderer that pipes sources through PostCSS
//!
//! All CSS work (imports, nesting, utilities, prefixing, minifying) belongs to
//! the external tool and its own config file. This side only feeds the source
//! on stdin and collects stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::config::PostcssConfig;
use crate::extend::{RenderData, RenderError, Renderer};

/// Placeholder in command arguments, replaced by the source path
const FROM_PLACEHOLDER: &str = ":from";

/// Runs an external PostCSS command as a renderer
#[derive(Debug, Clone)]
pub struct PostcssRenderer {
    command: String,
    args: Vec<String>,
    from: Option<PathBuf>,
    cwd: PathBuf,
}

impl PostcssRenderer {
    /// Build from config; relative paths resolve against `base_dir`
    pub fn new(config: &PostcssConfig, base_dir: &Path) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            from: config.from.as_ref().map(|from| base_dir.join(from)),
            cwd: base_dir.to_path_buf(),
        }
    }

    fn args_for(&self, path: Option<&Path>) -> Vec<String> {
        let from = path.or(self.from.as_deref());
        self.args
            .iter()
            .map(|arg| match from {
                Some(from) => arg.replace(FROM_PLACEHOLDER, &from.to_string_lossy()),
                None => arg.clone(),
            })
            .collect()
    }
}

impl Renderer for PostcssRenderer {
    fn render(&self, data: &RenderData<'_>) -> Result<String, RenderError> {
        let args = self.args_for(data.path);
        tracing::debug!("Running {} {}", self.command, args.join(" "));

        let mut child = Command::new(&self.command)
            .args(&args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdin not captured"))?;
        let text = data.text.to_string();
        // Feed stdin from its own thread so a full stdout pipe cannot stall us
        let writer = thread::spawn(move || stdin.write_all(text.as_bytes()));

        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(RenderError::Command {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // A successful command may exit before draining its input
        match writer
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))?
        {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(command: &str, args: &[&str]) -> PostcssRenderer {
        let config = PostcssConfig {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            from: Some("themes/site/source/css/main.pcss".to_string()),
            ..PostcssConfig::default()
        };
        PostcssRenderer::new(&config, &std::env::temp_dir())
    }

    #[test]
    fn test_from_placeholder() {
        let r = renderer("postcss", &["--from", ":from"]);
        let args = r.args_for(Some(Path::new("/site/source/css/app.scss")));
        assert_eq!(args, vec!["--from", "/site/source/css/app.scss"]);

        let args = r.args_for(None);
        assert!(args[1].ends_with("themes/site/source/css/main.pcss"));
    }

    #[cfg(unix)]
    #[test]
    fn test_pipes_through_command() {
        let r = renderer("cat", &[]);
        let css = r.render(&RenderData::new("a { color: red; }")).unwrap();
        assert_eq!(css, "a { color: red; }");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_ignoring_stdin() {
        let r = renderer("sh", &["-c", "exec echo ok"]);
        let big = "a { color: red; }\n".repeat(40_000);
        let css = r.render(&RenderData::new(&big)).unwrap();
        assert_eq!(css, "ok\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure() {
        let r = renderer("sh", &["-c", "cat >/dev/null; echo broken >&2; exit 3"]);
        let err = r.render(&RenderData::new("a {}")).unwrap_err();
        match err {
            RenderError::Command { stderr, .. } => assert_eq!(stderr, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_command() {
        let r = renderer("definitely-not-a-postcss-binary", &[]);
        let err = r.render(&RenderData::new("a {}")).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
