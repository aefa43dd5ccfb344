/*
 * Defines the messages that background scan and merge workers send back to
 * the interactive thread. Workers never touch session state themselves; the
 * session drains these messages and applies them in order, which keeps a
 * single writer for the entry collection.
 */
use super::file_system::FileSystemError;
use super::models::{FileEntry, MergedDocument};

/*
 * Progress of one background scan. Zero or more `EntryDiscovered` messages,
 * in discovery order, are followed by exactly one `Finished` or `Failed`.
 * A failed scan sends no entries.
 */
#[derive(Debug)]
pub enum ScanProgress {
    EntryDiscovered(FileEntry),
    Finished { entry_count: usize },
    Failed(FileSystemError),
}

/*
 * Result of one background merge. `document` is `None` only if the selection
 * handed to the worker was empty.
 */
#[derive(Debug)]
pub struct MergeProgress {
    pub document: Option<MergedDocument>,
}
