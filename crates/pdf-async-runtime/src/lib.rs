use std::path::PathBuf;

mod worker;

// Re-export types from library crates
pub use pdf_assemble::{
    ExportOptions, ImportFile, PageId, Session, SessionView, SkippedPage, WatermarkOptions,
};
pub use worker::{run_session, spawn_worker, worker_task};

/// Commands sent from a front end to the session worker
#[derive(Debug)]
pub enum SessionCommand {
    Import {
        files: Vec<ImportFile>,
    },
    ImportPaths {
        paths: Vec<PathBuf>,
    },
    ToggleSelect {
        id: PageId,
        additive: bool,
    },
    SelectAll,
    ClearSelection,
    EnterSelectionMode,
    ExitSelectionMode,
    Rotate {
        id: PageId,
    },
    RotateSelected,
    Delete {
        id: PageId,
    },
    DeleteSelected,
    Reorder {
        from: PageId,
        to: PageId,
    },
    /// Move by 0-based position
    MovePage {
        from: usize,
        to: usize,
    },
    Undo,
    Redo,
    /// Assemble the current ledger; with a path the result is also written
    /// to disk before `Exported` is sent.
    Export {
        options: ExportOptions,
        output_path: Option<PathBuf>,
    },
    /// Ask for the current state; answered even while an export runs
    Snapshot,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Import { .. } => "import",
            SessionCommand::ImportPaths { .. } => "import",
            SessionCommand::ToggleSelect { .. } => "toggle-select",
            SessionCommand::SelectAll => "select-all",
            SessionCommand::ClearSelection => "clear-selection",
            SessionCommand::EnterSelectionMode => "enter-selection-mode",
            SessionCommand::ExitSelectionMode => "exit-selection-mode",
            SessionCommand::Rotate { .. } => "rotate",
            SessionCommand::RotateSelected => "rotate-selected",
            SessionCommand::Delete { .. } => "delete",
            SessionCommand::DeleteSelected => "delete-selected",
            SessionCommand::Reorder { .. } | SessionCommand::MovePage { .. } => "reorder",
            SessionCommand::Undo => "undo",
            SessionCommand::Redo => "redo",
            SessionCommand::Export { .. } => "export",
            SessionCommand::Snapshot => "snapshot",
        }
    }
}

/// A file that failed to import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportError {
    pub name: String,
    pub message: String,
}

/// Updates sent from the worker to the front end
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// Sent after every command that changed something, and for `Snapshot`
    State(SessionView),
    Imported {
        pages_added: usize,
        failures: Vec<ImportError>,
    },
    /// The command was valid but had nothing to act on
    Ignored {
        command: &'static str,
    },
    ExportStarted,
    Exported {
        bytes: Vec<u8>,
        page_count: usize,
        skipped: Vec<SkippedPage>,
        path: Option<PathBuf>,
    },
    /// Rejected because an export is still running
    Busy {
        command: &'static str,
    },
    Error {
        message: String,
    },
}
