//! List registered extensions

use anyhow::Result;
use serde_json::json;

use crate::extend::Extend;
use crate::Hexo;

/// List tags or renderers
pub fn run(hexo: &Hexo, kind: &str, as_json: bool) -> Result<()> {
    let listing = listing(&hexo.extend, kind, as_json)?;
    print!("{}", listing);
    Ok(())
}

fn listing(extend: &Extend, kind: &str, as_json: bool) -> Result<String> {
    let out = match (kind, as_json) {
        ("tag" | "tags", false) => {
            let mut out = format!("Tags ({}):\n", extend.tag.len());
            for (name, options) in extend.tag.iter() {
                if options.ends {
                    out.push_str(&format!("  {} ... end{}\n", name, name));
                } else {
                    out.push_str(&format!("  {}\n", name));
                }
            }
            out
        }
        ("tag" | "tags", true) => {
            let tags: Vec<_> = extend
                .tag
                .iter()
                .map(|(name, options)| json!({ "name": name, "ends": options.ends }))
                .collect();
            format!("{}\n", serde_json::to_string_pretty(&tags)?)
        }
        ("renderer" | "renderers", false) => {
            let mut out = format!("Renderers ({}):\n", extend.renderer.len());
            for (ext, output) in extend.renderer.iter() {
                out.push_str(&format!("  .{} -> .{}\n", ext, output));
            }
            out
        }
        ("renderer" | "renderers", true) => {
            let renderers: Vec<_> = extend
                .renderer
                .iter()
                .map(|(ext, output)| json!({ "extension": ext, "output": output }))
                .collect();
            format!("{}\n", serde_json::to_string_pretty(&renderers)?)
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: tag, renderer", kind);
        }
    };

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::plugins;
    use std::path::Path;

    fn extend() -> Extend {
        let mut extend = Extend::new();
        plugins::register(&mut extend, &SiteConfig::default(), Path::new("."));
        extend
    }

    #[test]
    fn test_list_tags() {
        let out = listing(&extend(), "tags", false).unwrap();
        assert!(out.starts_with("Tags (1):"));
        assert!(out.contains("procon ... endprocon"));
    }

    #[test]
    fn test_list_renderers_json() {
        let out = listing(&extend(), "renderer", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let first = &value[0];
        assert_eq!(first["extension"], "md");
        assert_eq!(first["output"], "html");
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_kind() {
        assert!(listing(&extend(), "post", false).is_err());
    }
}
