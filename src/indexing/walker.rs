//! File system walker for discovering C# sources to scan
//!
//! This module provides directory traversal with support for:
//! - .gitignore rules
//! - .sharpdocignore files
//! - Ignore patterns from configuration
//! - Extension filtering and generated-file skipping

use crate::Settings;
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Suffixes of files produced by code generators
const GENERATED_SUFFIXES: &[&str] = &[".g.cs", ".g.i.cs", ".designer.cs", ".generated.cs"];

/// Walks directories to find source files to scan
#[derive(Debug)]
pub struct FileWalker {
    settings: Arc<Settings>,
}

impl FileWalker {
    /// Create a new file walker with the given settings
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Walk a directory and return the files to scan, sorted by path.
    ///
    /// A path naming a single file yields that file if its extension matches.
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);

        builder
            .hidden(true) // Skip hidden files and directories
            .git_ignore(true) // Respect .gitignore files
            .git_global(true) // Respect global gitignore
            .git_exclude(true) // Respect .git/info/exclude
            .follow_links(false)
            .max_depth(None)
            .require_git(false) // Allow gitignore to work in non-git directories
            .add_custom_ignore_filename(".sharpdocignore");

        if let Some(overrides) = self.ignore_overrides(root) {
            builder.overrides(overrides);
        }

        let mut files: Vec<PathBuf> = builder
            .build()
            .filter_map(Result::ok) // Skip files we can't access
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| self.is_source_file(path))
            .collect();

        files.sort();
        files
    }

    /// Ignore patterns from settings as negated overrides
    fn ignore_overrides(&self, root: &Path) -> Option<Override> {
        if self.settings.scanning.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = OverrideBuilder::new(root);
        for pattern in &self.settings.scanning.ignore_patterns {
            // A leading '!' turns an override into an exclusion
            if let Err(e) = builder.add(&format!("!{pattern}")) {
                warn!(pattern = %pattern, error = %e, "ignoring invalid ignore pattern");
            }
        }
        match builder.build() {
            Ok(overrides) => Some(overrides),
            Err(e) => {
                warn!(error = %e, "failed to build ignore patterns");
                None
            }
        }
    }

    fn is_source_file(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        if !self
            .settings
            .scanning
            .extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
        {
            return false;
        }

        if self.settings.scanning.skip_generated {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_lowercase();
            if GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                return false;
            }
        }
        true
    }

    /// Count files that would be scanned (useful for dry runs)
    pub fn count_files(&self, root: &Path) -> usize {
        self.walk(root).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn walker() -> FileWalker {
        FileWalker::new(Arc::new(Settings::default()))
    }

    #[test]
    fn test_walk_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("Program.cs"), "class Program { }").unwrap();
        fs::write(root.join("Model.cs"), "class Model { }").unwrap();
        fs::write(root.join("README.md"), "# Test").unwrap();

        let files = walker().walk(root);

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("Model.cs"));
        assert!(files[1].ends_with("Program.cs"));
    }

    #[test]
    fn test_skip_generated_and_build_output() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("obj/Debug")).unwrap();

        fs::write(root.join("Form.cs"), "class Form { }").unwrap();
        fs::write(root.join("Form.Designer.cs"), "partial class Form { }").unwrap();
        fs::write(root.join("Api.g.cs"), "class Api { }").unwrap();
        fs::write(root.join("obj/Debug/Assembly.cs"), "class X { }").unwrap();

        let files = walker().walk(root);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Form.cs"));
    }

    #[test]
    fn test_gitignore_and_sharpdocignore_respected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join(".gitignore"), "Ignored.cs\n").unwrap();
        fs::write(root.join(".sharpdocignore"), "Legacy.cs\n").unwrap();

        fs::write(root.join("Ignored.cs"), "class Ignored { }").unwrap();
        fs::write(root.join("Legacy.cs"), "class Legacy { }").unwrap();
        fs::write(root.join("Included.cs"), "class Included { }").unwrap();

        let files = walker().walk(root);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Included.cs"));
        assert_eq!(walker().count_files(root), 1);
    }
}
