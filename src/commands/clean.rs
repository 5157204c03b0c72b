//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Hexo;

/// Delete the public directory
pub fn run(hexo: &Hexo) -> Result<()> {
    if hexo.public_dir.exists() {
        fs::remove_dir_all(&hexo.public_dir)?;
        tracing::info!("Deleted: {:?}", hexo.public_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", hexo.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let hexo = Hexo::new(dir.path()).unwrap();
        fs::create_dir_all(hexo.public_dir.join("css")).unwrap();
        fs::write(hexo.public_dir.join("css/main.css"), "a{}").unwrap();

        run(&hexo).unwrap();
        assert!(!hexo.public_dir.exists());

        // Second run is a no-op
        run(&hexo).unwrap();
    }
}
