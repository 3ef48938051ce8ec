use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ExtractorError, Result};
use crate::parser::{parse, Stylesheet};

/// The text of one stylesheet and where it came from
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    canonical: PathBuf,
    content: String,
}

impl SourceDocument {
    /// Read a stylesheet from disk
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ExtractorError::InputError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        Ok(Self {
            path: path.to_path_buf(),
            canonical,
            content,
        })
    }

    /// Wrap text that did not come from disk; `path` only names it
    pub fn from_string(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            canonical: path.clone(),
            path,
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical path, used as the identity of the file in the import graph
    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Directory relative imports are resolved against
    pub fn directory(&self) -> &Path {
        self.canonical.parent().unwrap_or_else(|| Path::new("."))
    }

    /// File name without extension, used for `[name]` in scoped names
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Parse the document, attributing syntax errors to this file
    pub fn parse(&self) -> Result<Stylesheet> {
        parse(&self.content).map_err(|e| e.into_error(&self.display_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_from_disk() {
        let mut file = NamedTempFile::with_suffix(".module.scss").unwrap();
        file.write_all(b".a { color: red; }").unwrap();

        let doc = SourceDocument::read(file.path()).unwrap();
        assert_eq!(doc.content(), ".a { color: red; }");
        assert!(doc.canonical_path().is_absolute());
        assert!(doc.stem().ends_with(".module"));
    }

    #[test]
    fn test_missing_file() {
        let err = SourceDocument::read(Path::new("/definitely/not/here.css")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/definitely/not/here.css"), "{}", message);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let doc = SourceDocument::from_string("styles/broken.css", ".a {");
        let err = doc.parse().unwrap_err();
        assert_eq!(err.to_string(), "styles/broken.css:1:4: Unclosed block");
    }
}
