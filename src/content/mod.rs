//! Content module - front-matter, tag expansion and markdown for posts

mod frontmatter;
mod markdown;
mod post;

pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, DEFAULT_THEME};
pub use post::{is_markdown_file, Post};
