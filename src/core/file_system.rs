use super::config::MergerConfig;
use super::models::{FileEntry, normalized_extension};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/*
 * This module builds the file catalog: it walks a directory tree, keeps the
 * files whose extension is on the text allow-list, and reads their contents
 * into `FileEntry` values. It defines the errors that abort a scan, a trait
 * `FileCatalogOperations` for abstracting the scan, and the concrete
 * `CoreFileCatalog` built on `walkdir`.
 */

/*
 * Errors that make a whole scan fail. Individual unreadable files are not
 * errors; they get sentinel content instead.
 */
#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    Walk(walkdir::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<walkdir::Error> for FileSystemError {
    fn from(err: walkdir::Error) -> Self {
        FileSystemError::Walk(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::Walk(e) => write!(f, "Directory enumeration error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Invalid path: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            FileSystemError::Walk(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * Defines the scanning operations. `scan_with` hands each entry to a callback
 * as soon as its content has been read, which is what lets a background scan
 * populate the session progressively. Enumeration of the tree completes before
 * the first callback, so a failed enumeration never yields a partial list.
 */
pub trait FileCatalogOperations: Send + Sync {
    /*
     * Scans `root_path` recursively and calls `on_entry` for every included file,
     * in discovery order. Returns the number of entries produced.
     */
    fn scan_with(&self, root_path: &Path, on_entry: &mut dyn FnMut(FileEntry)) -> Result<usize>;

    // Collecting form of `scan_with`; the session always streams.
    #[cfg(test)]
    fn scan(&self, root_path: &Path) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        self.scan_with(root_path, &mut |entry| entries.push(entry))?;
        Ok(entries)
    }
}

pub struct CoreFileCatalog {
    config: MergerConfig,
}

impl CoreFileCatalog {
    pub fn new(config: MergerConfig) -> Self {
        CoreFileCatalog { config }
    }

    /*
     * Collects the paths (and normalized extensions) of all allow-listed files
     * under `root_path`. Any walk error aborts the enumeration.
     */
    fn enumerate_text_files(&self, root_path: &Path) -> Result<Vec<(PathBuf, String)>> {
        let mut candidates = Vec::new();
        for entry_result in WalkDir::new(root_path).sort_by_file_name() {
            let entry = entry_result?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(extension) = normalized_extension(entry.path()) else {
                log::trace!("FileCatalog: Skipping {:?}, no extension.", entry.path());
                continue;
            };
            if !self.config.is_text_extension(&extension) {
                log::trace!(
                    "FileCatalog: Skipping {:?}, extension '{extension}' not allowed.",
                    entry.path()
                );
                continue;
            }
            candidates.push((entry.into_path(), extension));
        }
        Ok(candidates)
    }

    fn read_content(&self, path: &Path) -> Arc<str> {
        match fs::read_to_string(path) {
            Ok(content) => Arc::from(content),
            Err(e) => {
                log::warn!("FileCatalog: Failed to read {path:?}: {e}");
                Arc::from(self.config.read_error_sentinel.as_str())
            }
        }
    }
}

impl Default for CoreFileCatalog {
    fn default() -> Self {
        Self::new(MergerConfig::default())
    }
}

impl FileCatalogOperations for CoreFileCatalog {
    fn scan_with(&self, root_path: &Path, on_entry: &mut dyn FnMut(FileEntry)) -> Result<usize> {
        if !root_path.is_dir() {
            return Err(FileSystemError::InvalidPath(root_path.to_path_buf()));
        }
        let root_path = std::path::absolute(root_path)?;
        log::debug!("FileCatalog: Scanning directory {root_path:?}.");

        let candidates = self.enumerate_text_files(&root_path)?;
        log::debug!(
            "FileCatalog: Found {} allow-listed files under {root_path:?}.",
            candidates.len()
        );

        let mut produced = 0;
        for (path, extension) in candidates {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            let content = self.read_content(&path);
            on_entry(FileEntry::new(path, name, extension, content));
            produced += 1;
        }

        log::debug!("FileCatalog: Scan complete, {produced} entries for {root_path:?}.");
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::READ_ERROR_SENTINEL;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_scan_keeps_only_allow_listed_files() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.txt"), "hello")?;
        fs::write(dir.path().join("b.png"), [0x89u8, 0x50, 0x4e, 0x47, 0x00, 0xff])?;
        fs::write(dir.path().join("c.md"), "world")?;
        let catalog = CoreFileCatalog::default();

        let entries = catalog.scan(dir.path())?;

        assert_eq!(names(&entries), vec!["a.txt", "c.md"]);
        assert_eq!(&*entries[0].content, "hello");
        assert_eq!(&*entries[1].content, "world");
        assert!(entries.iter().all(|e| e.is_selected));
        Ok(())
    }

    #[test]
    fn test_scan_recurses_and_matches_extensions_case_insensitively() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("src").join("deep"))?;
        fs::write(dir.path().join("README.MD"), "# readme")?;
        fs::write(dir.path().join("src").join("app.Config"), "<configuration/>")?;
        fs::write(dir.path().join("src").join("main.rs"), "fn main() {}")?;
        fs::write(dir.path().join("src").join("deep").join("style.css"), "a {}")?;
        fs::write(dir.path().join("Makefile"), "all:")?;
        let catalog = CoreFileCatalog::default();

        let entries = catalog.scan(dir.path())?;

        assert_eq!(names(&entries), vec!["README.MD", "app.Config", "style.css"]);
        let extensions: Vec<&str> = entries.iter().map(|e| e.extension.as_str()).collect();
        assert_eq!(extensions, vec![".md", ".config", ".css"]);
        for entry in &entries {
            assert!(entry.full_path.is_absolute());
            assert!(entry.full_path.ends_with(&entry.name));
        }
        Ok(())
    }

    #[test]
    fn test_unreadable_file_gets_sentinel_and_stays_in_catalog() -> Result<()> {
        let dir = tempdir()?;
        // Invalid UTF-8 cannot be read as text.
        let mut f = File::create(dir.path().join("broken.txt"))?;
        f.write_all(&[0xff, 0xfe, 0xfd, 0x00, 0x80])?;
        fs::write(dir.path().join("fine.json"), "{}")?;
        let catalog = CoreFileCatalog::default();

        let entries = catalog.scan(dir.path())?;

        assert_eq!(names(&entries), vec!["broken.txt", "fine.json"]);
        assert_eq!(&*entries[0].content, READ_ERROR_SENTINEL);
        assert!(entries[0].has_read_error());
        assert!(entries[0].is_selected);
        assert_eq!(&*entries[1].content, "{}");
        Ok(())
    }

    #[test]
    fn test_scan_with_streams_entries_in_discovery_order() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("b_dir"))?;
        fs::write(dir.path().join("a.js"), "1")?;
        fs::write(dir.path().join("b_dir").join("inner.xml"), "<x/>")?;
        fs::write(dir.path().join("c.html"), "<p/>")?;
        let catalog = CoreFileCatalog::default();

        let mut streamed = Vec::new();
        let count = catalog.scan_with(dir.path(), &mut |entry| streamed.push(entry.name))?;

        assert_eq!(count, 3);
        assert_eq!(streamed, vec!["a.js", "inner.xml", "c.html"]);
        assert_eq!(names(&catalog.scan(dir.path())?), streamed);
        Ok(())
    }

    #[test]
    fn test_scan_includes_files_named_only_by_extension() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(".txt"), "dot text")?;
        fs::write(dir.path().join(".MD"), "dot markdown")?;
        fs::write(dir.path().join(".gitignore"), "target/")?;
        fs::write(dir.path().join("x.txt"), "plain")?;
        let catalog = CoreFileCatalog::default();

        let entries = catalog.scan(dir.path())?;

        assert_eq!(names(&entries), vec![".MD", ".txt", "x.txt"]);
        let extensions: Vec<&str> = entries.iter().map(|e| e.extension.as_str()).collect();
        assert_eq!(extensions, vec![".md", ".txt", ".txt"]);
        assert_eq!(&*entries[0].content, "dot markdown");
        Ok(())
    }

    #[test]
    fn test_custom_allow_list_is_respected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("lib.rs"), "pub fn x() {}")?;
        fs::write(dir.path().join("notes.txt"), "notes")?;
        let config = MergerConfig {
            text_extensions: vec![".rs".to_string()],
            ..MergerConfig::default()
        };
        let catalog = CoreFileCatalog::new(config);

        let entries = catalog.scan(dir.path())?;

        assert_eq!(names(&entries), vec!["lib.rs"]);
        Ok(())
    }

    #[test]
    fn test_invalid_root_path() {
        let catalog = CoreFileCatalog::default();
        let result = catalog.scan(Path::new("this_path_does_not_exist_hopefully"));
        assert!(matches!(result, Err(FileSystemError::InvalidPath(_))));
    }

    #[test]
    fn test_file_as_root_is_invalid() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("single.txt");
        fs::write(&file_path, "not a directory")?;
        let catalog = CoreFileCatalog::default();

        let mut calls = 0;
        let result = catalog.scan_with(&file_path, &mut |_| calls += 1);

        assert!(matches!(result, Err(FileSystemError::InvalidPath(_))));
        assert_eq!(calls, 0);
        Ok(())
    }

    #[test]
    fn test_empty_directory_yields_no_entries() -> Result<()> {
        let dir = tempdir()?;
        let catalog = CoreFileCatalog::default();
        assert!(catalog.scan(dir.path())?.is_empty());
        Ok(())
    }
}
