//! Tag plugins
//!
//! Tags are author-facing markers embedded in post sources:
//!
//! ```text
//! {% procon %}
//! + Fast
//! - Young ecosystem
//! {% endprocon %}
//! ```
//!
//! A registered handler receives the marker's arguments and, for block tags,
//! the raw text between the opening and closing markers. Whatever it returns
//! is spliced back into the document in place of the whole block.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;

lazy_static! {
    /// `{% name args %}`, with optional `-` whitespace-control dashes
    static ref TAG_MARKER: Regex =
        Regex::new(r"\{%-?\s*([A-Za-z_]\w*(?:-\w+)*)(.*?)-?%\}").unwrap();
}

/// Errors raised while expanding tags
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Tag `{tag}` requires a body")]
    MissingContent { tag: String },

    #[error("Unclosed tag `{name}` at line {line}: expected {{% end{name} %}}")]
    Unclosed { name: String, line: usize },
}

/// A tag implementation
///
/// `content` is `Some` for block tags (registered with `ends: true`) and
/// `None` for inline tags.
pub trait TagHandler: Send + Sync {
    fn render(&self, args: &[String], content: Option<&str>) -> Result<String, TagError>;
}

impl<F> TagHandler for F
where
    F: Fn(&[String], Option<&str>) -> Result<String, TagError> + Send + Sync,
{
    fn render(&self, args: &[String], content: Option<&str>) -> Result<String, TagError> {
        self(args, content)
    }
}

/// Registration options for a tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOptions {
    /// Whether the tag has a closing `{% end<name> %}` marker
    pub ends: bool,
}

impl TagOptions {
    pub fn block() -> Self {
        Self { ends: true }
    }

    pub fn inline() -> Self {
        Self { ends: false }
    }
}

#[derive(Clone)]
struct TagEntry {
    handler: Arc<dyn TagHandler>,
    options: TagOptions,
}

/// Maps tag names to handlers, in registration order
#[derive(Clone, Default)]
pub struct TagRegistry {
    tags: IndexMap<String, TagEntry>,
}

/// A `{% ... %}` marker found in a document
struct Marker<'a> {
    name: &'a str,
    args: &'a str,
    span: Range<usize>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one
    pub fn register<H>(&mut self, name: &str, handler: H, options: TagOptions)
    where
        H: TagHandler + 'static,
    {
        let entry = TagEntry {
            handler: Arc::new(handler),
            options,
        };
        if self.tags.insert(name.to_string(), entry).is_some() {
            tracing::debug!("Replaced tag handler: {}", name);
        } else {
            tracing::debug!("Registered tag: {} (ends: {})", name, options.ends);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Look up a handler and its options
    pub fn get(&self, name: &str) -> Option<(&dyn TagHandler, TagOptions)> {
        self.tags
            .get(name)
            .map(|entry| (entry.handler.as_ref(), entry.options))
    }

    /// Registered tag names and options, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, TagOptions)> {
        self.tags
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.options))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Expand every registered tag in `text`
    ///
    /// Markers inside fenced code blocks are left alone, as are
    /// `{% raw %}...{% endraw %}` bodies and tags nobody registered.
    pub fn process(&self, text: &str) -> Result<String, TagError> {
        self.process_from(text, 1)
    }

    fn process_from(&self, text: &str, first_line: usize) -> Result<String, TagError> {
        let markers = find_markers(text);
        if markers.is_empty() {
            return Ok(text.to_string());
        }

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut i = 0;

        while i < markers.len() {
            let marker = &markers[i];
            output.push_str(&text[cursor..marker.span.start]);

            if marker.name == "raw" {
                let close = find_close(text, &markers, i, first_line)?;
                output.push_str(&text[marker.span.end..markers[close].span.start]);
                cursor = markers[close].span.end;
                i = close + 1;
                continue;
            }

            let Some(entry) = self.tags.get(marker.name) else {
                tracing::warn!(
                    "Unknown tag `{}` at line {}, left as-is",
                    marker.name,
                    line_at(text, marker.span.start, first_line)
                );
                output.push_str(&text[marker.span.clone()]);
                cursor = marker.span.end;
                i += 1;
                continue;
            };

            let args = split_args(marker.args);

            if entry.options.ends {
                let close = find_close(text, &markers, i, first_line)?;
                let body = &text[marker.span.end..markers[close].span.start];
                let body_line = line_at(text, marker.span.end, first_line);
                let body = self.process_from(body, body_line)?;
                output.push_str(&entry.handler.render(&args, Some(body.as_str()))?);
                cursor = markers[close].span.end;
                i = close + 1;
            } else {
                output.push_str(&entry.handler.render(&args, None)?);
                cursor = marker.span.end;
                i += 1;
            }
        }

        output.push_str(&text[cursor..]);
        Ok(output)
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.tags.iter().map(|(name, entry)| (name, entry.options)))
            .finish()
    }
}

/// Collect all markers outside fenced code blocks
fn find_markers(text: &str) -> Vec<Marker<'_>> {
    let fences = fenced_ranges(text);

    TAG_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if fences.iter().any(|r| r.contains(&whole.start())) {
                return None;
            }
            Some(Marker {
                name: caps.get(1)?.as_str(),
                args: caps.get(2).map_or("", |m| m.as_str().trim()),
                span: whole.range(),
            })
        })
        .collect()
}

/// Index of the marker closing `markers[open]`, honouring nested openings
fn find_close(
    text: &str,
    markers: &[Marker<'_>],
    open: usize,
    first_line: usize,
) -> Result<usize, TagError> {
    let name = markers[open].name;
    let end_name = format!("end{}", name);
    let mut depth = 1;

    let mut j = open + 1;
    while j < markers.len() {
        let marker = &markers[j];
        if marker.name == name {
            depth += 1;
        } else if marker.name == end_name {
            depth -= 1;
            if depth == 0 {
                return Ok(j);
            }
        } else if marker.name == "raw" {
            // Markers quoted inside a raw body never pair with ours
            j = find_close(text, markers, j, first_line)?;
        }
        j += 1;
    }

    Err(TagError::Unclosed {
        name: name.to_string(),
        line: line_at(text, markers[open].span.start, first_line),
    })
}

fn line_at(text: &str, pos: usize, first_line: usize) -> usize {
    first_line + text[..pos].matches('\n').count()
}

/// Byte ranges covered by ``` or ~~~ fenced code blocks
fn fenced_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    // (start offset, fence char, fence length)
    let mut open: Option<(usize, char, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start_matches(' ');
        let indent = line.len() - trimmed.len();

        if indent <= 3 {
            if let Some(ch) = trimmed.chars().next().filter(|c| *c == '`' || *c == '~') {
                let len = trimmed.chars().take_while(|c| *c == ch).count();
                if len >= 3 {
                    match open {
                        None => open = Some((offset, ch, len)),
                        Some((start, open_ch, open_len))
                            if open_ch == ch
                                && len >= open_len
                                && trimmed[len..].trim().is_empty() =>
                        {
                            ranges.push(start..offset + line.len());
                            open = None;
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        offset += line.len();
    }

    if let Some((start, _, _)) = open {
        ranges.push(start..text.len());
    }

    ranges
}

/// Split a tag's argument string on whitespace
///
/// Single or double quotes group words, and a backslash escapes the next
/// character.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_arg = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_arg = true;
            }
            '"' | '\'' if quote == Some(c) => quote = None,
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                in_arg = true;
            }
            c if c.is_whitespace() && quote.is_none() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_arg {
        args.push(current);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(_args: &[String], content: Option<&str>) -> Result<String, TagError> {
        Ok(content.unwrap_or_default().to_uppercase())
    }

    fn join_args(args: &[String], _content: Option<&str>) -> Result<String, TagError> {
        Ok(format!("[{}]", args.join("|")))
    }

    fn test_registry() -> TagRegistry {
        let mut tags = TagRegistry::new();
        tags.register("upper", upper, TagOptions::block());
        tags.register("args", join_args, TagOptions::inline());
        tags
    }

    #[test]
    fn test_block_tag() {
        let tags = test_registry();
        let html = tags
            .process("before\n{% upper %}shout{% endupper %}\nafter")
            .unwrap();
        assert_eq!(html, "before\nSHOUT\nafter");
    }

    #[test]
    fn test_inline_tag_with_args() {
        let tags = test_registry();
        let html = tags.process(r#"x {% args one "two words" 'three' %} y"#).unwrap();
        assert_eq!(html, "x [one|two words|three] y");
    }

    #[test]
    fn test_whitespace_control_dashes() {
        let tags = test_registry();
        assert_eq!(tags.process("{%- args a -%}").unwrap(), "[a]");
    }

    #[test]
    fn test_nested_blocks() {
        let mut tags = test_registry();
        tags.register(
            "wrap",
            |_: &[String], content: Option<&str>| {
                Ok::<_, TagError>(format!("<{}>", content.unwrap_or_default()))
            },
            TagOptions::block(),
        );
        let html = tags
            .process("{% wrap %}a{% wrap %}b{% endwrap %}c{% endwrap %}")
            .unwrap();
        assert_eq!(html, "<a<b>c>");
    }

    #[test]
    fn test_inner_tags_expand_first() {
        let tags = test_registry();
        let html = tags
            .process("{% upper %}{% args x %}{% endupper %}")
            .unwrap();
        assert_eq!(html, "[X]");
    }

    #[test]
    fn test_unclosed_block_reports_line() {
        let tags = test_registry();
        let err = tags.process("one\ntwo\n{% upper %}\nbody").unwrap_err();
        assert_eq!(
            err,
            TagError::Unclosed {
                name: "upper".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn test_unknown_tag_is_kept() {
        let tags = test_registry();
        let text = "{% youtube abc %}";
        assert_eq!(tags.process(text).unwrap(), text);
    }

    #[test]
    fn test_raw_block() {
        let tags = test_registry();
        let html = tags
            .process("{% raw %}{% upper %}x{% endupper %}{% endraw %}")
            .unwrap();
        assert_eq!(html, "{% upper %}x{% endupper %}");
    }

    #[test]
    fn test_raw_body_inside_block_is_opaque() {
        let tags = test_registry();
        let html = tags
            .process("{% upper %}a {% raw %}{% endupper %}{% endraw %} b{% endupper %}")
            .unwrap();
        assert_eq!(html, "A {% ENDUPPER %} B");
    }

    #[test]
    fn test_dash_right_after_name() {
        let tags = test_registry();
        let html = tags
            .process("{% upper-%}x{%- endupper-%} {% args-%}")
            .unwrap();
        assert_eq!(html, "X []");
    }

    #[test]
    fn test_hyphenated_tag_name() {
        let mut tags = test_registry();
        tags.register("pull-quote", join_args, TagOptions::inline());
        assert_eq!(tags.process("{% pull-quote a %}").unwrap(), "[a]");
    }

    #[test]
    fn test_code_fence_is_untouched() {
        let tags = test_registry();
        let text = "```\n{% upper %}\n```\n{% args a %}";
        assert_eq!(tags.process(text).unwrap(), "```\n{% upper %}\n```\n[a]");
    }

    #[test]
    fn test_text_without_tags() {
        let tags = test_registry();
        assert_eq!(tags.process("plain *markdown*").unwrap(), "plain *markdown*");
    }

    #[test]
    fn test_register_replaces() {
        let mut tags = test_registry();
        tags.register("args", upper, TagOptions::block());
        assert_eq!(tags.len(), 2);
        let (_, options) = tags.get("args").unwrap();
        assert!(options.ends);
    }

    #[test]
    fn test_iter_in_registration_order() {
        let tags = test_registry();
        let names: Vec<_> = tags.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["upper", "args"]);
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args(""), Vec::<String>::new());
        assert_eq!(split_args("a  b"), vec!["a", "b"]);
        assert_eq!(split_args(r#""a b" c"#), vec!["a b", "c"]);
        assert_eq!(split_args(r"a\ b"), vec!["a b"]);
        assert_eq!(split_args(r#"''"#), vec![""]);
    }
}
