//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::PostcssConfig;
pub use site::SiteConfig;
