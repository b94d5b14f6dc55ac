use crate::{ImportError, SessionCommand, SessionUpdate};
use pdf_assemble::{
    Assembled, AssembleError, ExportOptions, ImportReport, Outcome, Session, assemble, save_pdf,
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type ExportTask = JoinHandle<pdf_assemble::Result<(Assembled, Option<PathBuf>)>>;

/// Start a worker with a fresh session on the current runtime
pub fn spawn_worker() -> (
    mpsc::UnboundedSender<SessionCommand>,
    mpsc::UnboundedReceiver<SessionUpdate>,
    JoinHandle<()>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(worker_task(command_rx, update_tx));
    (command_tx, update_rx, handle)
}

/// Async worker task that owns a session, processes commands and sends updates
pub async fn worker_task(
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: mpsc::UnboundedSender<SessionUpdate>,
) {
    run_session(Session::new(), command_rx, update_tx).await;
}

/// Drive an existing session until the command channel closes. An export
/// runs in the background; until it finishes every command but `Snapshot`
/// is answered with `Busy`.
pub async fn run_session(
    mut session: Session,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: mpsc::UnboundedSender<SessionUpdate>,
) {
    let mut export: Option<ExportTask> = None;

    loop {
        tokio::select! {
            biased;

            cmd = command_rx.recv() => {
                let Some(cmd) = cmd else { break };

                if export.is_some() && !matches!(cmd, SessionCommand::Snapshot) {
                    log::debug!("Rejecting {} while an export is running", cmd.name());
                    let _ = update_tx.send(SessionUpdate::Busy { command: cmd.name() });
                    continue;
                }

                if let Some(task) = process_command(cmd, &mut session, &update_tx).await {
                    export = Some(task);
                }
            }
            result = wait_export(&mut export), if export.is_some() => {
                export = None;
                send_export_result(result, &update_tx);
            }
        }
    }

    // Let a running export finish so its result is not lost
    if export.is_some() {
        let result = wait_export(&mut export).await;
        send_export_result(result, &update_tx);
    }
    log::debug!("Session worker stopped");
}

async fn wait_export(export: &mut Option<ExportTask>) -> pdf_assemble::Result<(Assembled, Option<PathBuf>)> {
    match export {
        Some(task) => task.await.map_err(AssembleError::from).and_then(|r| r),
        None => std::future::pending().await,
    }
}

fn send_export_result(
    result: pdf_assemble::Result<(Assembled, Option<PathBuf>)>,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    let update = match result {
        Ok((assembled, path)) => SessionUpdate::Exported {
            bytes: assembled.bytes,
            page_count: assembled.page_count,
            skipped: assembled.skipped,
            path,
        },
        Err(e) => {
            log::error!("Export failed: {}", e);
            SessionUpdate::Error {
                message: format!("Export failed: {}", e),
            }
        }
    };
    let _ = update_tx.send(update);
}

/// Apply one command. Returns the export task when the command started one.
async fn process_command(
    cmd: SessionCommand,
    session: &mut Session,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) -> Option<ExportTask> {
    let name = cmd.name();
    let outcome = match cmd {
        SessionCommand::Import { files } => {
            let report = session.import_async(files).await;
            send_import_report(&report, update_tx);
            report.outcome()
        }
        SessionCommand::ImportPaths { paths } => {
            let report = session.import_paths(paths.as_slice()).await;
            send_import_report(&report, update_tx);
            report.outcome()
        }
        SessionCommand::ToggleSelect { id, additive } => session.toggle_select(id, additive),
        SessionCommand::SelectAll => session.select_all(),
        SessionCommand::ClearSelection => session.clear_selection(),
        SessionCommand::EnterSelectionMode => {
            session.enter_selection_mode();
            Outcome::Applied
        }
        SessionCommand::ExitSelectionMode => {
            session.exit_selection_mode();
            Outcome::Applied
        }
        SessionCommand::Rotate { id } => session.rotate(id),
        SessionCommand::RotateSelected => session.rotate_selected(),
        SessionCommand::Delete { id } => session.delete(id),
        SessionCommand::DeleteSelected => session.delete_selected(),
        SessionCommand::Reorder { from, to } => session.reorder(from, to),
        SessionCommand::MovePage { from, to } => session.move_page(from, to),
        SessionCommand::Undo => session.undo(),
        SessionCommand::Redo => session.redo(),
        SessionCommand::Export {
            options,
            output_path,
        } => return start_export(session, options, output_path, update_tx),
        SessionCommand::Snapshot => Outcome::Applied,
    };

    let update = match outcome {
        Outcome::Applied => SessionUpdate::State(session.view()),
        Outcome::NoOp => SessionUpdate::Ignored { command: name },
    };
    let _ = update_tx.send(update);
    None
}

fn start_export(
    session: &Session,
    options: ExportOptions,
    output_path: Option<PathBuf>,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) -> Option<ExportTask> {
    // Invalid options fail before the worker turns busy
    if let Err(e) = options.validate() {
        let _ = update_tx.send(SessionUpdate::Error {
            message: format!("Export failed: {}", e),
        });
        return None;
    }

    let input = session.export_input();
    log::info!("Starting export of {} page(s)", input.pages.len());
    let _ = update_tx.send(SessionUpdate::ExportStarted);

    Some(tokio::spawn(async move {
        let assembled = assemble(input, options).await?;
        if let Some(path) = &output_path {
            save_pdf(&assembled.bytes, path).await?;
        }
        Ok((assembled, output_path))
    }))
}

fn send_import_report(report: &ImportReport, update_tx: &mpsc::UnboundedSender<SessionUpdate>) {
    let _ = update_tx.send(SessionUpdate::Imported {
        pages_added: report.pages_added.len(),
        failures: report
            .failures
            .iter()
            .map(|f| ImportError {
                name: f.name.clone(),
                message: f.error.to_string(),
            })
            .collect(),
    });
}
