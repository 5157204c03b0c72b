//! Front-matter parsing

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Front-matter of a source document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Unpublished posts are skipped unless drafts are rendered
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            published: true,
            extra: HashMap::new(),
        }
    }
}

impl FrontMatter {
    /// Split front-matter off the top of `content`
    ///
    /// Returns the parsed front-matter and the remaining body. Content without
    /// a front-matter block yields the defaults and the whole input.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let trimmed = content.trim_start();

        if let Some(rest) = trimmed.strip_prefix("---") {
            return Ok(Self::parse_yaml(rest).unwrap_or((FrontMatter::default(), content)));
        }

        if let Some(rest) = trimmed.strip_prefix(";;;") {
            return Self::parse_json(rest);
        }

        Ok((FrontMatter::default(), content))
    }

    /// `None` when the block is not front-matter (a markdown rule, say)
    fn parse_yaml(rest: &str) -> Option<(Self, &str)> {
        let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;
        let end = rest.find("\n---")?;
        let yaml = &rest[..end];
        let body = rest[end + 4..].trim_start_matches(['\n', '\r']);

        if yaml.trim().is_empty() {
            return Some((FrontMatter::default(), body));
        }

        // `--- text ---` separators show up in prose; require a `key:` line
        let first = yaml
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))?;
        let (key, _) = first.split_once(':')?;
        if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return None;
        }

        match serde_yaml::from_str(yaml) {
            Ok(fm) => Some((fm, body)),
            Err(e) => {
                tracing::warn!("Ignoring unparseable front-matter: {}", e);
                None
            }
        }
    }

    fn parse_json(rest: &str) -> Result<(Self, &str)> {
        let end = rest
            .find(";;;")
            .ok_or_else(|| anyhow!("Unterminated JSON front-matter"))?;
        let json = rest[..end].trim();
        let body = rest[end + 3..].trim_start_matches(['\n', '\r']);

        let fm = if json.is_empty() {
            FrontMatter::default()
        } else {
            let json = if json.starts_with('{') {
                json.to_string()
            } else {
                format!("{{{}}}", json)
            };
            serde_json::from_str(&json)
                .map_err(|e| anyhow!("Failed to parse JSON front-matter: {}", e))?
        };

        Ok((fm, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Choosing a generator
layout: post
cover: /img/cover.png
---

Body text.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Choosing a generator".to_string()));
        assert_eq!(
            fm.extra.get("layout").and_then(|v| v.as_str()),
            Some("post")
        );
        assert!(fm.published);
        assert!(fm.extra.contains_key("cover"));
        assert_eq!(body, "Body text.\n");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = ";;;\n\"title\": \"Test Post\", \"published\": false\n;;;\nContent.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Test Post".to_string()));
        assert!(!fm.published);
        assert_eq!(body, "Content.");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Heading\n\ntext";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(body, content);
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = "---\n\nSome text: with a colon later\n\n---\nMore.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_json() {
        assert!(FrontMatter::parse(";;;\n\"title\": \"x\"").is_err());
    }
}
