// src/core/merger.rs

use super::models::{FileEntry, MergedDocument};
use time::OffsetDateTime;
use time::macros::format_description;

const HEADER_RULE: &str = "------------------------------------------";
const BANNER_RULE: &str = "==========================================";

/*
 * Assembles the merged document from entries already held in memory. No I/O
 * happens here, so the cost is proportional to the selected content size; the
 * session runs it on a background thread for that reason.
 */
pub trait MergerOperations: Send + Sync {
    /*
     * Concatenates the selected entries, in the order given, under a header
     * stamped with `generated_on`. Returns `None` when nothing is selected.
     */
    fn merge(&self, entries: &[FileEntry], generated_on: OffsetDateTime)
    -> Option<MergedDocument>;
}

pub struct CoreMerger {}

impl CoreMerger {
    pub fn new() -> Self {
        CoreMerger {}
    }
}

impl Default for CoreMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerOperations for CoreMerger {
    fn merge(
        &self,
        entries: &[FileEntry],
        generated_on: OffsetDateTime,
    ) -> Option<MergedDocument> {
        let selected: Vec<&FileEntry> = entries.iter().filter(|e| e.is_selected).collect();
        if selected.is_empty() {
            log::debug!("Merger: No selected entries, nothing to merge.");
            return None;
        }

        let content_len: usize = selected.iter().map(|e| e.content.len()).sum();
        let mut text = String::with_capacity(content_len + selected.len() * 256);

        text.push_str(&format!("--- Merged {} Files ---\n", selected.len()));
        text.push_str(&format!(
            "Generated on: {}\n",
            format_timestamp(generated_on)
        ));
        text.push_str(HEADER_RULE);
        text.push_str("\n\n");

        for entry in &selected {
            text.push_str(BANNER_RULE);
            text.push('\n');
            text.push_str(&format!("FILE: {}\n", entry.name));
            text.push_str(&format!("PATH: {}\n", entry.full_path.display()));
            text.push_str(BANNER_RULE);
            text.push('\n');
            text.push_str(&entry.content);
            text.push_str("\n\n");
        }

        log::debug!(
            "Merger: Merged {} entries into {} bytes.",
            selected.len(),
            text.len()
        );
        Some(MergedDocument {
            text,
            file_count: selected.len(),
        })
    }
}

/*
 * Wall-clock time for the merge header. The local offset is unavailable on
 * some platforms once other threads exist; UTC is used then.
 */
pub fn current_timestamp() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    timestamp
        .format(&format)
        .unwrap_or_else(|_| timestamp.to_string())
}
