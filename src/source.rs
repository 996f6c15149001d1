//! Source file identity (§3 "Source file").

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: String,
}

impl SourceFile {
    pub fn read(path: &Path) -> Result<Self, SourceError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Io(path.to_path_buf(), e.to_string()))?;
        Ok(SourceFile {
            path: path.to_path_buf(),
            contents,
        })
    }

    pub fn in_memory(name: &str, contents: impl Into<String>) -> Self {
        SourceFile {
            path: PathBuf::from(name),
            contents: contents.into(),
        }
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug)]
pub enum SourceError {
    Io(PathBuf, String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(path, e) => write!(f, "failed to read {}: {}", path.display(), e),
        }
    }
}

impl std::error::Error for SourceError {}

/// Both `.rg` and `.rugo` are accepted entry-point extensions; `.rugo` is
/// canonical (spec §9 open question).
pub fn has_rugo_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("rugo") | Some("rg")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_extensions() {
        assert!(has_rugo_extension(Path::new("main.rugo")));
        assert!(has_rugo_extension(Path::new("main.rg")));
        assert!(!has_rugo_extension(Path::new("main.rb")));
    }

    #[test]
    fn in_memory_source_has_stable_path() {
        let src = SourceFile::in_memory("main.rugo", "puts \"hi\"");
        assert_eq!(src.display_path(), "main.rugo");
    }
}
