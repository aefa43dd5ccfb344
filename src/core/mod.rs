/*
 * This module consolidates the core, presentation-agnostic logic of the
 * application: the file catalog (scanning), grouping, merging, preview
 * truncation and export, together with the `MergeSession` that owns the entry
 * collection and coordinates background work. The scanning, merging and
 * exporting steps sit behind traits (`FileCatalogOperations`,
 * `MergerOperations`, `ExporterOperations`) so they can be mocked in tests.
 */
pub mod config;
pub mod exporter;
pub mod file_system;
pub mod grouper;
pub mod merger;
pub mod models;
pub mod preview;
pub mod session;
pub mod task_progress;

// Re-export key structures
pub use config::MergerConfig;
pub use grouper::EntryGroup;
pub use models::FileEntry;

// Re-export pipeline services
pub use exporter::{CoreExporter, ExportError};
pub use file_system::FileCatalogOperations;
pub use merger::CoreMerger;

pub use session::{MergeSession, Notification, SessionError, SessionEvent};
