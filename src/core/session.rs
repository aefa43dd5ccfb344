/*
 * This module defines `MergeSession`, the state owned by the interactive
 * thread: the canonical entry collection, the last merged document, the
 * current preview, the busy flag and the receivers of any background work.
 * Background scan and merge workers only send `task_progress` messages; the
 * session applies them in `poll_background`/`wait_until_idle`, so every
 * mutation happens on the thread that owns the session. Interested parties
 * (the presentation layer) observe changes through `subscribe`.
 */
use crate::core::config::MergerConfig;
use crate::core::exporter::{CoreExporter, ExportError, ExporterOperations};
use crate::core::file_system::{CoreFileCatalog, FileCatalogOperations};
use crate::core::grouper::{self, EntryGroup};
use crate::core::merger::{self, CoreMerger, MergerOperations};
use crate::core::models::{FileEntry, MergedDocument};
use crate::core::preview;
use crate::core::task_progress::{MergeProgress, ScanProgress};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

// User-facing messages; the presentation layer decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ScanError(String),
    MergeError(String),
    NothingToExport,
    ExportSucceeded(PathBuf),
    ExportFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    EntriesCleared,
    EntryAdded { index: usize },
    SelectionChanged { index: usize, is_selected: bool },
    BusyChanged(bool),
    PreviewChanged,
    GroupingChanged(bool),
    ScanCompleted { entry_count: usize },
    MergeCompleted { file_count: usize },
    Notification(Notification),
}

#[derive(Debug)]
pub enum SessionError {
    Busy,
    WorkerSpawn(io::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Busy => write!(f, "A scan or merge is already in progress"),
            SessionError::WorkerSpawn(e) => write!(f, "Could not start background worker: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::WorkerSpawn(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SessionEvent)>;

pub struct MergeSession {
    config: MergerConfig,
    catalog: Arc<dyn FileCatalogOperations>,
    merger: Arc<dyn MergerOperations>,
    exporter: Arc<dyn ExporterOperations>,
    root_path: Option<PathBuf>,
    entries: Vec<FileEntry>,
    merged_document: Option<MergedDocument>,
    preview_text: String,
    open_entry: Option<usize>,
    group_by_type: bool,
    is_busy: bool,
    scan_receiver: Option<Receiver<ScanProgress>>,
    merge_receiver: Option<Receiver<MergeProgress>>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription_id: u64,
}

impl MergeSession {
    /*
     * Creates a session backed by the core catalog, merger and exporter.
     */
    pub fn new(config: MergerConfig) -> Self {
        let catalog = Arc::new(CoreFileCatalog::new(config.clone()));
        Self::with_services(
            config,
            catalog,
            Arc::new(CoreMerger::new()),
            Arc::new(CoreExporter::new()),
        )
    }

    pub fn with_services(
        config: MergerConfig,
        catalog: Arc<dyn FileCatalogOperations>,
        merger: Arc<dyn MergerOperations>,
        exporter: Arc<dyn ExporterOperations>,
    ) -> Self {
        log::debug!("MergeSession::with_services called - initializing empty session.");
        MergeSession {
            config,
            catalog,
            merger,
            exporter,
            root_path: None,
            entries: Vec::new(),
            merged_document: None,
            preview_text: String::new(),
            open_entry: None,
            group_by_type: false,
            is_busy: false,
            scan_receiver: None,
            merge_receiver: None,
            subscribers: Vec::new(),
            next_subscription_id: 1,
        }
    }

    // --- Subscriptions ---

    pub fn subscribe(&mut self, callback: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        before != self.subscribers.len()
    }

    fn emit(&mut self, event: SessionEvent) {
        log::trace!("MergeSession: Emitting {event:?}");
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.emit(SessionEvent::Notification(notification));
    }

    fn set_busy(&mut self, busy: bool) {
        if self.is_busy != busy {
            self.is_busy = busy;
            self.emit(SessionEvent::BusyChanged(busy));
        }
    }

    // --- Read access ---

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    pub fn merged_document(&self) -> Option<&MergedDocument> {
        self.merged_document.as_ref()
    }

    pub fn has_merged_document(&self) -> bool {
        self.merged_document.as_ref().is_some_and(|d| !d.is_empty())
    }

    pub fn preview_text(&self) -> &str {
        &self.preview_text
    }

    pub fn open_entry(&self) -> Option<&FileEntry> {
        self.open_entry.and_then(|i| self.entries.get(i))
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    pub fn group_by_type(&self) -> bool {
        self.group_by_type
    }

    /*
     * Extension groups for display when grouping is on, `None` otherwise.
     * Indices refer to `entries()`; the canonical order is never changed.
     */
    pub fn display_groups(&self) -> Option<Vec<EntryGroup>> {
        self.group_by_type
            .then(|| grouper::group_entries(&self.entries))
    }

    fn index_of(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.full_path == path)
    }

    // --- Scanning ---

    /*
     * Replaces the catalog with a fresh scan of `root`. All prior state (entries,
     * merged document, preview) is cleared before the worker starts. Entries
     * arrive through `poll_background`/`wait_until_idle`.
     */
    pub fn start_scan(&mut self, root: &Path) -> Result<(), SessionError> {
        if self.is_busy {
            log::warn!("MergeSession: Scan of {root:?} rejected, session is busy.");
            return Err(SessionError::Busy);
        }
        log::info!("MergeSession: Starting scan of {root:?}.");

        self.entries.clear();
        self.merged_document = None;
        self.open_entry = None;
        self.preview_text.clear();
        self.root_path = Some(root.to_path_buf());
        self.emit(SessionEvent::EntriesCleared);
        self.emit(SessionEvent::PreviewChanged);

        let (sender, receiver) = mpsc::channel();
        let catalog = Arc::clone(&self.catalog);
        let root_for_worker = root.to_path_buf();
        let spawn_result = thread::Builder::new()
            .name("scan-worker".to_string())
            .spawn(move || {
                let result = catalog.scan_with(&root_for_worker, &mut |entry| {
                    if sender.send(ScanProgress::EntryDiscovered(entry)).is_err() {
                        log::debug!("ScanWorker: Receiver dropped, discarding entry.");
                    }
                });
                let final_message = match result {
                    Ok(entry_count) => ScanProgress::Finished { entry_count },
                    Err(e) => ScanProgress::Failed(e),
                };
                if sender.send(final_message).is_err() {
                    log::debug!("ScanWorker: Receiver dropped before scan completed.");
                }
            });

        if let Err(e) = spawn_result {
            log::error!("MergeSession: Failed to spawn scan worker: {e}");
            self.notify(Notification::ScanError(e.to_string()));
            return Err(SessionError::WorkerSpawn(e));
        }
        self.scan_receiver = Some(receiver);
        self.set_busy(true);
        Ok(())
    }

    /*
     * Applies one scan message. Returns true once the scan has ended.
     */
    fn apply_scan_progress(&mut self, progress: ScanProgress) -> bool {
        match progress {
            ScanProgress::EntryDiscovered(entry) => {
                self.entries.push(entry);
                let index = self.entries.len() - 1;
                self.emit(SessionEvent::EntryAdded { index });
                false
            }
            ScanProgress::Finished { entry_count } => {
                log::info!("MergeSession: Scan finished with {entry_count} entries.");
                self.emit(SessionEvent::ScanCompleted { entry_count });
                self.set_busy(false);
                true
            }
            ScanProgress::Failed(e) => {
                self.fail_scan(format!("Error scanning: {e}"));
                true
            }
        }
    }

    fn fail_scan(&mut self, message: String) {
        log::error!("MergeSession: {message}");
        if !self.entries.is_empty() {
            self.entries.clear();
            self.emit(SessionEvent::EntriesCleared);
        }
        self.notify(Notification::ScanError(message));
        self.set_busy(false);
    }

    fn drain_scan(&mut self, blocking: bool) {
        let Some(receiver) = self.scan_receiver.take() else {
            return;
        };
        loop {
            let message = if blocking {
                receiver.recv().map_err(|_| TryRecvError::Disconnected)
            } else {
                receiver.try_recv()
            };
            match message {
                Ok(progress) => {
                    if self.apply_scan_progress(progress) {
                        return;
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.scan_receiver = Some(receiver);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    self.fail_scan("Error scanning: scan worker stopped unexpectedly".to_string());
                    return;
                }
            }
        }
    }

    // --- Merging ---

    /*
     * Merges the currently selected entries on a background thread. With
     * nothing selected this is a no-op that keeps any previous merged document
     * and returns `Ok(false)`.
     */
    pub fn start_merge(&mut self) -> Result<bool, SessionError> {
        if self.is_busy {
            log::warn!("MergeSession: Merge rejected, session is busy.");
            return Err(SessionError::Busy);
        }
        let selected: Vec<FileEntry> = self
            .entries
            .iter()
            .filter(|e| e.is_selected)
            .cloned()
            .collect();
        if selected.is_empty() {
            log::info!("MergeSession: Merge requested with no selected entries, keeping previous result.");
            return Ok(false);
        }
        log::info!("MergeSession: Starting merge of {} entries.", selected.len());

        if self.open_entry.take().is_some() {
            self.show_merged_preview();
        }
        let (sender, receiver) = mpsc::channel();
        let generated_on = merger::current_timestamp();
        let merge_service = Arc::clone(&self.merger);
        let spawn_result = thread::Builder::new()
            .name("merge-worker".to_string())
            .spawn(move || {
                let document = merge_service.merge(&selected, generated_on);
                if sender.send(MergeProgress { document }).is_err() {
                    log::debug!("MergeWorker: Receiver dropped before merge completed.");
                }
            });

        if let Err(e) = spawn_result {
            log::error!("MergeSession: Failed to spawn merge worker: {e}");
            return Err(SessionError::WorkerSpawn(e));
        }
        self.merge_receiver = Some(receiver);
        self.set_busy(true);
        Ok(true)
    }

    fn apply_merge_progress(&mut self, progress: MergeProgress) {
        match progress.document {
            Some(document) => {
                let file_count = document.file_count;
                self.preview_text =
                    preview::derive_preview(&document.text, self.config.preview_char_limit);
                self.merged_document = Some(document);
                self.emit(SessionEvent::PreviewChanged);
                self.emit(SessionEvent::MergeCompleted { file_count });
            }
            None => {
                log::info!("MergeSession: Merge produced nothing, keeping previous result.");
            }
        }
        self.set_busy(false);
    }

    fn drain_merge(&mut self, blocking: bool) {
        let Some(receiver) = self.merge_receiver.take() else {
            return;
        };
        let message = if blocking {
            receiver.recv().map_err(|_| TryRecvError::Disconnected)
        } else {
            receiver.try_recv()
        };
        match message {
            Ok(progress) => self.apply_merge_progress(progress),
            Err(TryRecvError::Empty) => self.merge_receiver = Some(receiver),
            Err(TryRecvError::Disconnected) => {
                log::error!("MergeSession: Merge worker stopped unexpectedly.");
                self.notify(Notification::MergeError(
                    "Error merging: merge worker stopped unexpectedly".to_string(),
                ));
                self.set_busy(false);
            }
        }
    }

    // --- Background pumping ---

    /*
     * Applies any messages that background workers have produced so far without
     * blocking. Returns true while work is still in flight.
     */
    pub fn poll_background(&mut self) -> bool {
        self.drain_scan(false);
        self.drain_merge(false);
        self.is_busy
    }

    /*
     * Blocks until all in-flight background work has completed and its results
     * have been applied.
     */
    pub fn wait_until_idle(&mut self) {
        while self.scan_receiver.is_some() || self.merge_receiver.is_some() {
            self.drain_scan(true);
            self.drain_merge(true);
        }
    }

    // --- Selection ---

    /*
     * Sets the selection flag of the entry at `path`. Returns false if no such
     * entry exists.
     */
    pub fn set_entry_selected(&mut self, path: &Path, is_selected: bool) -> bool {
        let Some(index) = self.index_of(path) else {
            log::warn!("MergeSession: No entry for {path:?} to update selection.");
            return false;
        };
        if self.entries[index].is_selected != is_selected {
            self.entries[index].is_selected = is_selected;
            self.emit(SessionEvent::SelectionChanged { index, is_selected });
        }
        true
    }

    pub fn toggle_entry(&mut self, path: &Path) -> Option<bool> {
        let index = self.index_of(path)?;
        let new_state = !self.entries[index].is_selected;
        self.set_entry_selected(path, new_state);
        Some(new_state)
    }

    pub fn toggle_group(&mut self, extension: &str) -> Option<bool> {
        let before: Vec<bool> = self.entries.iter().map(|e| e.is_selected).collect();
        let new_state = grouper::toggle_group(&mut self.entries, extension)?;
        let changed: Vec<usize> = before
            .iter()
            .enumerate()
            .filter(|(i, was)| **was != self.entries[*i].is_selected)
            .map(|(i, _)| i)
            .collect();
        for index in changed {
            self.emit(SessionEvent::SelectionChanged {
                index,
                is_selected: new_state,
            });
        }
        Some(new_state)
    }

    pub fn set_group_by_type(&mut self, group_by_type: bool) {
        if self.group_by_type != group_by_type {
            self.group_by_type = group_by_type;
            self.emit(SessionEvent::GroupingChanged(group_by_type));
        }
    }

    // --- Preview ---

    /*
     * Shows the (possibly truncated) content of a single entry as the preview.
     */
    pub fn open_entry_preview(&mut self, path: &Path) -> bool {
        let Some(index) = self.index_of(path) else {
            log::warn!("MergeSession: No entry for {path:?} to preview.");
            return false;
        };
        self.preview_text =
            preview::derive_preview(&self.entries[index].content, self.config.preview_char_limit);
        self.open_entry = Some(index);
        self.emit(SessionEvent::PreviewChanged);
        true
    }

    /*
     * Closes the single-entry preview and falls back to the merged document
     * preview, or to nothing if no merge has happened yet.
     */
    pub fn close_entry_preview(&mut self) {
        if self.open_entry.take().is_some() {
            self.show_merged_preview();
        }
    }

    fn show_merged_preview(&mut self) {
        self.preview_text = match &self.merged_document {
            Some(document) => preview::derive_preview(&document.text, self.config.preview_char_limit),
            None => String::new(),
        };
        self.emit(SessionEvent::PreviewChanged);
    }

    // --- Export ---

    /*
     * Fails with `NothingToExport` (and notifies) when there is no merged
     * document yet.
     */
    pub fn ensure_exportable(&mut self) -> Result<(), ExportError> {
        if self.has_merged_document() {
            return Ok(());
        }
        self.notify(Notification::NothingToExport);
        Err(ExportError::NothingToExport)
    }

    /*
     * Writes the full, untruncated merged document to `destination` and reports
     * the outcome as a notification.
     */
    pub fn export_to(&mut self, destination: &Path) -> Result<(), ExportError> {
        let document = self
            .merged_document
            .as_ref()
            .map(|d| d.text.as_str())
            .unwrap_or("");
        let result = self.exporter.export(document, destination);
        match &result {
            Ok(()) => self.notify(Notification::ExportSucceeded(destination.to_path_buf())),
            Err(ExportError::NothingToExport) => self.notify(Notification::NothingToExport),
            Err(e) => {
                log::error!("MergeSession: Export to {destination:?} failed: {e}");
                self.notify(Notification::ExportFailed(e.to_string()));
            }
        }
        result
    }
}
