//! `procon` tag - a pros and cons list
//!
//! ```text
//! {% procon %}
//! + Single static binary
//! + Fast rebuilds
//! - Smaller plugin ecosystem
//! {% endprocon %}
//! ```
//!
//! Lines starting with `+ ` are pros, lines starting with `- ` are cons, and
//! every other line is ignored. Item text goes into the HTML as written, so
//! inline markup in an item is kept and nothing is escaped. Lines are split on
//! `\n` only; a CRLF source keeps the `\r` at the end of each item.

use crate::extend::TagError;

/// Name the tag is registered under
pub const NAME: &str = "procon";

const PRO_PREFIX: &str = "+ ";
const CON_PREFIX: &str = "- ";

/// Items of a `procon` block, in source order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProCon<'a> {
    pub pros: Vec<&'a str>,
    pub cons: Vec<&'a str>,
}

impl<'a> ProCon<'a> {
    pub fn parse(content: &'a str) -> Self {
        let mut list = Self::default();

        for line in content.split('\n') {
            if let Some(pro) = line.strip_prefix(PRO_PREFIX) {
                list.pros.push(pro);
            } else if let Some(con) = line.strip_prefix(CON_PREFIX) {
                list.cons.push(con);
            }
        }

        list
    }

    /// Render both lists; an empty list still gets its `<ul>`
    ///
    /// The fragment ends with a newline so a line written right after the
    /// closing tag starts outside the HTML block.
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            "<div>\n  <h4>Pro's and Cons</h4>\n  <div class=\"grid gap-4\">\n",
        );
        push_list(&mut html, "pro", &self.pros);
        push_list(&mut html, "con", &self.cons);
        html.push_str("  </div>\n</div>\n");
        html
    }
}

// No blank lines: the fragment has to stay a single HTML block when the
// surrounding post goes through markdown afterwards.
fn push_list(html: &mut String, class: &str, items: &[&str]) {
    html.push_str("    <ul class=\"procon ");
    html.push_str(class);
    html.push_str("\">\n");

    if !items.is_empty() {
        html.push_str("      ");
        for item in items {
            html.push_str("<li>");
            html.push_str(item);
            html.push_str("</li>");
        }
        html.push('\n');
    }

    html.push_str("    </ul>\n");
}

/// Tag handler. Arguments are accepted and ignored.
pub fn render(_args: &[String], content: Option<&str>) -> Result<String, TagError> {
    let content = content.ok_or_else(|| TagError::MissingContent {
        tag: NAME.to_string(),
    })?;
    Ok(ProCon::parse(content).to_html())
}
