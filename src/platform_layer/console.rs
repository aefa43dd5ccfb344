/*
 * A line-oriented console front end. It implements the picker dialogs by
 * prompting on stdin, translates typed commands into `UserAction`s, pumps the
 * session while background work is in flight (printing entries as they are
 * discovered) and prints session notifications.
 */
use super::types::{DialogOperations, UserAction};
use crate::app_logic::{ActionOutcome, FileMergerLogic};
use crate::core::{EntryGroup, FileEntry, MergeSession, Notification, SessionEvent};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(30);

const HELP_TEXT: &str = "\
Commands:
  scan              pick a folder and scan it
  list              show discovered files
  status            show folder, selection and merge state
  toggle <n>        select/deselect file number n
  group <ext>       select/deselect all files with extension ext
  groupby on|off    group the listing by extension
  preview <n>       preview file number n
  close             close the file preview
  merge             merge the selected files
  show              print the current preview
  export            write the merged document to a file
  help              show this text
  quit              exit";

pub struct ConsoleDialogs {}

impl ConsoleDialogs {
    pub fn new() -> Self {
        ConsoleDialogs {}
    }

    /*
     * Prints `label` and reads one line. An empty answer (or EOF) counts as a
     * cancelled dialog.
     */
    fn prompt_for_path(label: &str) -> Option<PathBuf> {
        print!("{label}: ");
        if let Err(e) = io::stdout().flush() {
            log::warn!("ConsoleDialogs: Failed to flush stdout: {e}");
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) => None,
            Ok(_) => {
                let trimmed = answer.trim();
                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
            }
            Err(e) => {
                log::error!("ConsoleDialogs: Failed to read answer: {e}");
                None
            }
        }
    }
}

impl Default for ConsoleDialogs {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogOperations for ConsoleDialogs {
    fn pick_folder(&mut self) -> Option<PathBuf> {
        Self::prompt_for_path("Folder to scan (empty to cancel)")
    }

    fn pick_save_destination(&mut self) -> Option<PathBuf> {
        Self::prompt_for_path("Save merged text as (empty to cancel)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Action(UserAction),
    List,
    Status,
    ShowPreview,
    Help,
    Quit,
}

fn entry_path_for(argument: Option<&str>, entries: &[FileEntry]) -> Result<PathBuf, String> {
    let raw = argument.ok_or_else(|| "Missing file number.".to_string())?;
    let number: usize = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a file number."))?;
    number
        .checked_sub(1)
        .and_then(|index| entries.get(index))
        .map(|entry| entry.full_path.clone())
        .ok_or_else(|| format!("There is no file number {number}."))
}

fn normalize_extension_argument(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{lowered}")
    }
}

/*
 * Parses one input line. File numbers are 1-based positions in `entries`.
 */
pub fn parse_command(line: &str, entries: &[FileEntry]) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("Empty command.".to_string());
    };
    let argument = words.next();
    let command = match verb.to_lowercase().as_str() {
        "scan" => ConsoleCommand::Action(UserAction::ScanRequested),
        "merge" => ConsoleCommand::Action(UserAction::MergeRequested),
        "export" => ConsoleCommand::Action(UserAction::ExportRequested),
        "toggle" => {
            ConsoleCommand::Action(UserAction::ToggleEntry(entry_path_for(argument, entries)?))
        }
        "preview" => {
            ConsoleCommand::Action(UserAction::OpenPreview(entry_path_for(argument, entries)?))
        }
        "close" => ConsoleCommand::Action(UserAction::ClosePreview),
        "group" => {
            let raw = argument.ok_or_else(|| "Missing extension.".to_string())?;
            ConsoleCommand::Action(UserAction::ToggleGroup(normalize_extension_argument(raw)))
        }
        "groupby" => match argument {
            Some("on") => ConsoleCommand::Action(UserAction::SetGroupByType(true)),
            Some("off") => ConsoleCommand::Action(UserAction::SetGroupByType(false)),
            _ => return Err("Use 'groupby on' or 'groupby off'.".to_string()),
        },
        "list" | "ls" => ConsoleCommand::List,
        "status" => ConsoleCommand::Status,
        "show" => ConsoleCommand::ShowPreview,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
    };
    Ok(command)
}

pub fn describe_notification(notification: &Notification) -> String {
    match notification {
        Notification::ScanError(message) => message.clone(),
        Notification::MergeError(message) => message.clone(),
        Notification::NothingToExport => "Nothing to export. Please merge files first.".to_string(),
        Notification::ExportSucceeded(path) => {
            format!("Export Successful! Written to {}", path.display())
        }
        Notification::ExportFailed(message) => message.clone(),
    }
}

pub fn describe_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Notification(n) => Some(describe_notification(n)),
        SessionEvent::ScanCompleted { entry_count } => {
            Some(format!("Scan complete: {entry_count} files."))
        }
        SessionEvent::MergeCompleted { file_count } => Some(format!("Merged {file_count} files.")),
        _ => None,
    }
}

// Session subscriber installed for the lifetime of `run`.
pub fn render_event(event: &SessionEvent) {
    if let Some(text) = describe_event(event) {
        println!("{text}");
    }
}

pub fn render_entry_line(index: usize, entry: &FileEntry) -> String {
    let mark = if entry.is_selected { 'x' } else { ' ' };
    let unreadable = if entry.has_read_error() { " [unreadable]" } else { "" };
    format!(
        "[{mark}] {:>3}. {}  ({}){unreadable}",
        index + 1,
        entry.name,
        entry.full_path.display()
    )
}

/*
 * Renders the entry listing, flat in catalog order or partitioned by the
 * given extension groups.
 */
pub fn render_listing(entries: &[FileEntry], groups: Option<&[EntryGroup]>) -> String {
    if entries.is_empty() {
        return "No files. Use 'scan' first.".to_string();
    }
    let mut lines = Vec::new();
    match groups {
        None => {
            for (index, entry) in entries.iter().enumerate() {
                lines.push(render_entry_line(index, entry));
            }
        }
        Some(groups) => {
            for group in groups {
                let mark = if group.all_selected { 'x' } else { ' ' };
                lines.push(format!(
                    "[{mark}] {} ({} files)",
                    group.extension,
                    group.entry_indices.len()
                ));
                for &index in &group.entry_indices {
                    if let Some(entry) = entries.get(index) {
                        lines.push(format!("    {}", render_entry_line(index, entry)));
                    }
                }
            }
        }
    }
    lines.join("\n")
}

pub fn render_status(session: &MergeSession) -> String {
    let folder = session
        .root_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());
    let selected = session.entries().iter().filter(|e| e.is_selected).count();
    let mut lines = vec![
        format!("Folder: {folder}"),
        format!("Files: {} ({selected} selected)", session.entries().len()),
        format!(
            "Grouping by type: {}",
            if session.group_by_type() { "on" } else { "off" }
        ),
    ];
    match session.merged_document() {
        Some(document) => lines.push(format!("Last merge: {} files", document.file_count)),
        None => lines.push("Last merge: none".to_string()),
    }
    if let Some(entry) = session.open_entry() {
        lines.push(format!("Previewing: {}", entry.name));
    }
    lines.join("\n")
}

/*
 * Applies background results until the session is idle, printing each entry
 * as the scan delivers it.
 */
fn pump_until_idle(logic: &mut FileMergerLogic) {
    let mut shown = logic.session().entries().len();
    loop {
        let still_busy = logic.poll_background();
        let entries = logic.session().entries();
        if entries.len() < shown {
            shown = 0;
        }
        for (index, entry) in entries.iter().enumerate().skip(shown) {
            println!("  + {}", render_entry_line(index, entry));
        }
        shown = entries.len();
        if !still_busy {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn report_outcome(action: &UserAction, outcome: ActionOutcome) {
    match (action, outcome) {
        (_, ActionOutcome::Rejected) => println!("Busy, please wait for the current task."),
        (UserAction::MergeRequested, ActionOutcome::NothingToDo) => {
            println!("No files selected, nothing merged.")
        }
        (UserAction::ToggleGroup(ext), ActionOutcome::NothingToDo) => {
            println!("No files with extension {ext}.")
        }
        (_, ActionOutcome::Cancelled) => println!("Cancelled."),
        _ => {}
    }
}

/*
 * Runs the interactive loop until 'quit' or end of input.
 */
pub fn run(logic: &mut FileMergerLogic) -> io::Result<()> {
    println!("FileMerger - type 'help' for commands.");
    let subscription = logic.session_mut().subscribe(render_event);
    let result = run_commands(logic);
    logic.session_mut().wait_until_idle();
    logic.session_mut().unsubscribe(subscription);
    result
}

fn run_commands(logic: &mut FileMergerLogic) -> io::Result<()> {
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line, logic.session().entries()) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match command {
            ConsoleCommand::Action(action) => {
                let outcome = logic.handle_action(action.clone());
                log::debug!("Console: {action:?} -> {outcome:?}");
                report_outcome(&action, outcome);
                if outcome == ActionOutcome::Started {
                    println!("Working...");
                    pump_until_idle(logic);
                    if matches!(action, UserAction::MergeRequested) {
                        println!("{}", logic.session().preview_text());
                    }
                }
                if matches!(action, UserAction::OpenPreview(_)) && outcome == ActionOutcome::Completed {
                    println!("{}", logic.session().preview_text());
                }
            }
            ConsoleCommand::List => {
                let session = logic.session();
                let groups = session.display_groups();
                println!("{}", render_listing(session.entries(), groups.as_deref()));
            }
            ConsoleCommand::Status => println!("{}", render_status(logic.session())),
            ConsoleCommand::ShowPreview => {
                if let Some(entry) = logic.session().open_entry() {
                    println!("--- {} ---", entry.name);
                }
                println!("{}", logic.session().preview_text());
            }
            ConsoleCommand::Help => println!("{HELP_TEXT}"),
            ConsoleCommand::Quit => break,
        }
    }
    Ok(())
}
