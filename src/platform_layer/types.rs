/*
 * This module defines the types exchanged between the presentation layer and
 * the application logic: the platform-agnostic `UserAction`s the user can
 * trigger, and the `DialogOperations` trait through which the logic asks the
 * platform for a folder to scan or a file to export to.
 */

use std::path::PathBuf;

/*
 * Represents a user request, translated by the presentation layer from
 * whatever input it receives (button, menu, typed command).
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    ScanRequested,
    MergeRequested,
    ExportRequested,
    ToggleEntry(PathBuf),
    ToggleGroup(String),
    OpenPreview(PathBuf),
    ClosePreview,
    SetGroupByType(bool),
}

/*
 * Picker dialogs provided by the platform. `None` means the user cancelled.
 */
pub trait DialogOperations {
    fn pick_folder(&mut self) -> Option<PathBuf>;
    fn pick_save_destination(&mut self) -> Option<PathBuf>;
}
