use std::path::{Path, PathBuf};
use std::sync::Arc;

// Content substituted for a file that could not be read during a scan.
pub const READ_ERROR_SENTINEL: &str = "[Error reading file]";

/*
 * Represents one discovered text file together with its user-selection state.
 * The content is read once at scan time and shared immutably (`Arc<str>`), so
 * snapshots handed to a background merge do not copy file data.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub full_path: PathBuf,
    pub extension: String,
    pub content: Arc<str>,
    pub is_selected: bool,
}

impl FileEntry {
    /// Creates a new, selected entry.
    pub fn new(full_path: PathBuf, name: String, extension: String, content: Arc<str>) -> Self {
        FileEntry {
            name,
            full_path,
            extension,
            content,
            is_selected: true,
        }
    }

    pub fn has_read_error(&self) -> bool {
        &*self.content == READ_ERROR_SENTINEL
    }
}

/*
 * Lower-cased extension of `path`, including the leading dot (".txt").
 * A file named only by its extension (".txt", ".MD") counts as having that
 * extension, although `Path::extension` reports none for it.
 * Returns `None` for paths without an extension.
 */
pub fn normalized_extension(path: &Path) -> Option<String> {
    if let Some(ext) = path.extension() {
        return Some(format!(".{}", ext.to_string_lossy().to_lowercase()));
    }
    let name = path.file_name()?.to_string_lossy();
    let bare = name.strip_prefix('.')?;
    (!bare.is_empty() && !bare.contains('.')).then(|| format!(".{}", bare.to_lowercase()))
}

/*
 * The result of a merge: the full, untruncated text and the number of entries
 * that went into it. This is the unit of export.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub text: String,
    pub file_count: usize,
}

impl MergedDocument {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_new_defaults_to_selected() {
        let p = PathBuf::from("/tmp/foo.txt");
        let e = FileEntry::new(p.clone(), "foo.txt".into(), ".txt".into(), Arc::from("hi"));
        assert_eq!(e.full_path, p);
        assert_eq!(e.name, "foo.txt");
        assert_eq!(e.extension, ".txt");
        assert_eq!(&*e.content, "hi");
        assert!(e.is_selected);
        assert!(!e.has_read_error());
    }

    #[test]
    fn test_sentinel_content_is_reported_as_read_error() {
        let e = FileEntry::new(
            PathBuf::from("/tmp/locked.md"),
            "locked.md".into(),
            ".md".into(),
            Arc::from(READ_ERROR_SENTINEL),
        );
        assert!(e.has_read_error());
    }

    #[test]
    fn test_normalized_extension_lowercases_and_keeps_dot() {
        assert_eq!(
            normalized_extension(Path::new("a/B.JSON")),
            Some(".json".to_string())
        );
        assert_eq!(
            normalized_extension(Path::new("archive.tar.Md")),
            Some(".md".to_string())
        );
        assert_eq!(normalized_extension(Path::new("Makefile")), None);
    }

    #[test]
    fn test_extension_only_file_name_is_its_own_extension() {
        assert_eq!(
            normalized_extension(Path::new("notes/.txt")),
            Some(".txt".to_string())
        );
        assert_eq!(normalized_extension(Path::new(".MD")), Some(".md".to_string()));
        assert_eq!(
            normalized_extension(Path::new(".gitignore")),
            Some(".gitignore".to_string())
        );
        assert_eq!(normalized_extension(Path::new(".")), None);
        assert_eq!(normalized_extension(Path::new("..")), None);
    }
}
