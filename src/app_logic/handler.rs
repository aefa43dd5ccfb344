use crate::core::{ExportError, MergeSession, SessionError};
use crate::platform_layer::{DialogOperations, UserAction};

/*
 * What became of a `UserAction`. Lets the presentation layer decide whether
 * to wait for background work or refresh its view.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /* Background work was started; pump the session until idle. */
    Started,
    /* The action completed synchronously. */
    Completed,
    /* The user cancelled a picker dialog. */
    Cancelled,
    /* The session was busy with a scan or merge. */
    Rejected,
    /* The action had nothing to act on (no selection, unknown entry, no merge). */
    NothingToDo,
    /* The action ran and failed; a notification has been emitted. */
    Failed,
}

/*
 * Manages the application flow in a presentation-agnostic manner. It turns
 * `UserAction`s into `MergeSession` operations and uses `DialogOperations`
 * for the folder and save-destination pickers.
 */
pub struct FileMergerLogic {
    session: MergeSession,
    dialogs: Box<dyn DialogOperations>,
}

impl FileMergerLogic {
    pub fn new(session: MergeSession, dialogs: Box<dyn DialogOperations>) -> Self {
        FileMergerLogic { session, dialogs }
    }

    pub fn session(&self) -> &MergeSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut MergeSession {
        &mut self.session
    }

    pub fn poll_background(&mut self) -> bool {
        self.session.poll_background()
    }

    pub fn handle_action(&mut self, action: UserAction) -> ActionOutcome {
        log::debug!("AppLogic: Handling {action:?}");
        match action {
            UserAction::ScanRequested => self.on_scan_requested(),
            UserAction::MergeRequested => self.on_merge_requested(),
            UserAction::ExportRequested => self.on_export_requested(),
            UserAction::ToggleEntry(path) => match self.session.toggle_entry(&path) {
                Some(_) => ActionOutcome::Completed,
                None => ActionOutcome::NothingToDo,
            },
            UserAction::ToggleGroup(extension) => match self.session.toggle_group(&extension) {
                Some(_) => ActionOutcome::Completed,
                None => ActionOutcome::NothingToDo,
            },
            UserAction::OpenPreview(path) => {
                if self.session.open_entry_preview(&path) {
                    ActionOutcome::Completed
                } else {
                    ActionOutcome::NothingToDo
                }
            }
            UserAction::ClosePreview => {
                self.session.close_entry_preview();
                ActionOutcome::Completed
            }
            UserAction::SetGroupByType(enabled) => {
                self.session.set_group_by_type(enabled);
                ActionOutcome::Completed
            }
        }
    }

    fn on_scan_requested(&mut self) -> ActionOutcome {
        if self.session.is_busy() {
            log::warn!("AppLogic: Scan requested while busy, ignoring.");
            return ActionOutcome::Rejected;
        }
        let Some(folder) = self.dialogs.pick_folder() else {
            log::debug!("AppLogic: Folder picker cancelled.");
            return ActionOutcome::Cancelled;
        };
        match self.session.start_scan(&folder) {
            Ok(()) => ActionOutcome::Started,
            Err(e) => Self::outcome_for_session_error(&e),
        }
    }

    fn on_merge_requested(&mut self) -> ActionOutcome {
        match self.session.start_merge() {
            Ok(true) => ActionOutcome::Started,
            Ok(false) => ActionOutcome::NothingToDo,
            Err(e) => Self::outcome_for_session_error(&e),
        }
    }

    /*
     * Checks for merged content before showing the save picker, so the user is
     * told there is nothing to export instead of being asked for a file name.
     */
    fn on_export_requested(&mut self) -> ActionOutcome {
        if let Err(e) = self.session.ensure_exportable() {
            log::info!("AppLogic: Export requested without merged content: {e}");
            return ActionOutcome::NothingToDo;
        }
        let Some(destination) = self.dialogs.pick_save_destination() else {
            log::debug!("AppLogic: Save picker cancelled.");
            return ActionOutcome::Cancelled;
        };
        match self.session.export_to(&destination) {
            Ok(()) => ActionOutcome::Completed,
            Err(ExportError::NothingToExport) => ActionOutcome::NothingToDo,
            Err(ExportError::WriteFailed(_)) => ActionOutcome::Failed,
        }
    }

    fn outcome_for_session_error(error: &SessionError) -> ActionOutcome {
        match error {
            SessionError::Busy => ActionOutcome::Rejected,
            SessionError::WorkerSpawn(e) => {
                log::error!("AppLogic: {e}");
                ActionOutcome::Failed
            }
        }
    }
}
