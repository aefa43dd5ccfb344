/*
 * In-process settings for the scan/merge/preview pipeline. Nothing here is
 * persisted; every session starts from `MergerConfig::default()`. Keeping the
 * values in one struct lets tests shrink the preview limit or widen the
 * allow-list without touching the pipeline code.
 */
use super::models::READ_ERROR_SENTINEL;

pub const DEFAULT_TEXT_EXTENSIONS: [&str; 10] = [
    ".txt", ".cs", ".xml", ".json", ".md", ".xaml", ".css", ".js", ".html", ".config",
];

pub const DEFAULT_PREVIEW_CHAR_LIMIT: usize = 20_000;

#[derive(Debug, Clone)]
pub struct MergerConfig {
    /* Lower-cased extensions, with leading dot, that a scan will include. */
    pub text_extensions: Vec<String>,
    /* Maximum number of characters shown in a preview before truncation. */
    pub preview_char_limit: usize,
    /* Content used for entries whose file could not be read. */
    pub read_error_sentinel: String,
}

impl MergerConfig {
    /*
     * Checks a normalized extension (".txt") against the allow-list.
     * The comparison is case-insensitive so callers may pass raw extensions.
     */
    pub fn is_text_extension(&self, extension: &str) -> bool {
        let lowered = extension.to_lowercase();
        self.text_extensions.iter().any(|allowed| *allowed == lowered)
    }
}

impl Default for MergerConfig {
    fn default() -> Self {
        MergerConfig {
            text_extensions: DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            preview_char_limit: DEFAULT_PREVIEW_CHAR_LIMIT,
            read_error_sentinel: READ_ERROR_SENTINEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list_matches_known_text_types() {
        let config = MergerConfig::default();
        for ext in DEFAULT_TEXT_EXTENSIONS {
            assert!(config.is_text_extension(ext), "{ext} should be allowed");
        }
        assert!(config.is_text_extension(".MD"));
        assert!(!config.is_text_extension(".png"));
        assert!(!config.is_text_extension(".rs"));
        assert!(!config.is_text_extension(""));
        assert_eq!(config.preview_char_limit, 20_000);
        assert_eq!(config.read_error_sentinel, "[Error reading file]");
    }
}
