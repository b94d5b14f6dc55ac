//! Editing session: the single dispatcher that owns the ledger, the
//! selection and the undo history.
//!
//! Every mutating command snapshots the ledger before it runs and reports
//! whether it changed anything. Commands that find nothing to do leave
//! history untouched.

use crate::assemble::{Assembled, AssemblyInput, assemble};
use crate::history::History;
use crate::ledger::Ledger;
use crate::materialize::{LopdfMaterializer, Materialized, PageMaterializer, materialize};
use crate::options::ExportOptions;
use crate::selection::Selection;
use crate::types::*;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// A file handed to [`Session::import`]
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// A file that could not be imported
#[derive(Debug)]
pub struct ImportFailure {
    pub name: String,
    pub error: AssembleError,
}

/// What an import batch did
#[derive(Debug, Default)]
pub struct ImportReport {
    pub files_added: Vec<FileId>,
    pub pages_added: Vec<PageId>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn outcome(&self) -> Outcome {
        if self.pages_added.is_empty() {
            Outcome::NoOp
        } else {
            Outcome::Applied
        }
    }
}

/// Read-only state for a presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub pages: Vec<PageDescriptor>,
    /// Selected ids in page order
    pub selected: Vec<PageId>,
    pub selection_mode: bool,
    pub page_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub struct Session {
    ledger: Ledger,
    selection: Selection,
    history: History,
    materializer: Arc<dyn PageMaterializer>,
    next_page_id: u64,
    next_file_id: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_materializer(Arc::new(LopdfMaterializer))
    }

    pub fn with_materializer(materializer: Arc<dyn PageMaterializer>) -> Self {
        Self {
            ledger: Ledger::new(),
            selection: Selection::new(),
            history: History::new(),
            materializer,
            next_page_id: 1,
            next_file_id: 1,
        }
    }

    // ---------------------------------------------------------------------
    // Import
    // ---------------------------------------------------------------------

    /// Materialize a batch of files and append their pages in input order.
    /// A file that fails is reported and skipped; the rest still land. The
    /// whole batch is one history step.
    pub fn import(&mut self, files: Vec<ImportFile>) -> ImportReport {
        let results = files
            .into_iter()
            .map(|file| {
                let file_id = self.allocate_file_id();
                let result = self
                    .materializer
                    .materialize(file_id, &file.name, Arc::from(file.bytes));
                (file.name, result)
            })
            .collect();

        self.commit_import(results)
    }

    /// Same as [`Session::import`], with decoding moved off the executor
    pub async fn import_async(&mut self, files: Vec<ImportFile>) -> ImportReport {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.materialize_blocking(file.name, file.bytes).await);
        }
        self.commit_import(results)
    }

    /// Read files from disk and import them, decoding off the executor
    pub async fn import_paths(&mut self, paths: &[impl AsRef<Path>]) -> ImportReport {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    results.push((name, Err(AssembleError::Io(e))));
                    continue;
                }
            };

            results.push(self.materialize_blocking(name, bytes).await);
        }

        self.commit_import(results)
    }

    async fn materialize_blocking(
        &mut self,
        name: String,
        bytes: Vec<u8>,
    ) -> (String, Result<Materialized>) {
        let file_id = self.allocate_file_id();
        let result = materialize(
            Arc::clone(&self.materializer),
            file_id,
            name.clone(),
            Arc::from(bytes),
        )
        .await;
        (name, result)
    }

    fn commit_import(&mut self, results: Vec<(String, Result<Materialized>)>) -> ImportReport {
        let before = self.ledger.snapshot();
        let mut report = ImportReport::default();
        let mut accepted = Vec::new();

        for (name, result) in results {
            match result {
                Ok(materialized) => accepted.push(materialized),
                Err(error) => {
                    log::warn!("Failed to import {}: {}", name, error);
                    report.failures.push(ImportFailure { name, error });
                }
            }
        }

        for materialized in accepted {
            let file_id = materialized.source.id;
            let pages: Vec<PageDescriptor> = materialized
                .pages
                .into_iter()
                .map(|page| PageDescriptor {
                    id: self.allocate_page_id(),
                    source_file: file_id,
                    source_page_index: page.source_page_index,
                    rotation: Rotation::None,
                    thumbnail: page.thumbnail,
                    width: page.width,
                    height: page.height,
                })
                .collect();

            log::info!("Imported {} ({} page(s))", materialized.source.name, pages.len());
            report.pages_added.extend(pages.iter().map(|p| p.id));
            report.files_added.push(file_id);
            self.ledger.append(pages, materialized.source);
        }

        if !report.pages_added.is_empty() {
            self.history.record(before);
        }
        report
    }

    fn allocate_page_id(&mut self) -> PageId {
        let id = PageId(self.next_page_id);
        self.next_page_id += 1;
        id
    }

    fn allocate_file_id(&mut self) -> FileId {
        let id = FileId(self.next_file_id);
        self.next_file_id += 1;
        id
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    pub fn toggle_select(&mut self, id: PageId, additive: bool) -> Outcome {
        if !self.ledger.contains(id) {
            return Outcome::NoOp;
        }
        self.selection.toggle(id, additive);
        Outcome::Applied
    }

    pub fn select_all(&mut self) -> Outcome {
        if self.ledger.is_empty() {
            return Outcome::NoOp;
        }
        self.selection.select_all(&self.ledger.ids());
        Outcome::Applied
    }

    pub fn clear_selection(&mut self) -> Outcome {
        if self.selection.is_empty() {
            return Outcome::NoOp;
        }
        self.selection.clear();
        Outcome::Applied
    }

    pub fn enter_selection_mode(&mut self) {
        self.selection.enter_mode();
    }

    /// Leave selection mode and drop the selection
    pub fn exit_selection_mode(&mut self) {
        self.selection.exit_mode();
    }

    // ---------------------------------------------------------------------
    // Page edits
    // ---------------------------------------------------------------------

    /// Rotate a page a quarter turn clockwise. When the page is part of the
    /// selection, the whole selection turns with it.
    pub fn rotate(&mut self, id: PageId) -> Outcome {
        if !self.ledger.contains(id) {
            return Outcome::NoOp;
        }

        self.history.record(self.ledger.snapshot());
        if self.selection.contains(id) {
            self.ledger.rotate_many(self.selection.ids());
        } else {
            self.ledger.rotate(id);
        }
        Outcome::Applied
    }

    pub fn rotate_selected(&mut self) -> Outcome {
        if self.selection.is_empty() {
            return Outcome::NoOp;
        }

        self.history.record(self.ledger.snapshot());
        self.ledger.rotate_many(self.selection.ids());
        Outcome::Applied
    }

    pub fn delete(&mut self, id: PageId) -> Outcome {
        if !self.ledger.contains(id) {
            return Outcome::NoOp;
        }

        self.history.record(self.ledger.snapshot());
        self.ledger.remove(&HashSet::from([id]));
        let surviving: HashSet<PageId> = self.ledger.ids().into_iter().collect();
        self.selection.prune(&surviving);
        Outcome::Applied
    }

    pub fn delete_selected(&mut self) -> Outcome {
        if self.selection.is_empty() {
            return Outcome::NoOp;
        }

        self.history.record(self.ledger.snapshot());
        let removed = self.ledger.remove(self.selection.ids());
        log::debug!("Deleted {} selected page(s)", removed);
        self.selection.clear();
        Outcome::Applied
    }

    /// Move `from` to the position currently held by `to`
    pub fn reorder(&mut self, from: PageId, to: PageId) -> Outcome {
        let (Some(from_index), Some(to_index)) = (self.ledger.index_of(from), self.ledger.index_of(to))
        else {
            return Outcome::NoOp;
        };
        self.move_page(from_index, to_index)
    }

    /// Move the page at position `from` to position `to` (0-based)
    pub fn move_page(&mut self, from: usize, to: usize) -> Outcome {
        let len = self.ledger.len();
        if from == to || from >= len || to >= len {
            return Outcome::NoOp;
        }

        self.history.record(self.ledger.snapshot());
        self.ledger.reorder(from, to);
        Outcome::Applied
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    pub fn undo(&mut self) -> Outcome {
        match self.history.undo(self.ledger.snapshot()) {
            Some(previous) => {
                self.ledger.restore(previous);
                self.selection.clear();
                Outcome::Applied
            }
            None => Outcome::NoOp,
        }
    }

    pub fn redo(&mut self) -> Outcome {
        match self.history.redo(self.ledger.snapshot()) {
            Some(next) => {
                self.ledger.restore(next);
                self.selection.clear();
                Outcome::Applied
            }
            None => Outcome::NoOp,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn pages(&self) -> &[PageDescriptor] {
        self.ledger.pages()
    }

    pub fn page(&self, id: PageId) -> Option<&PageDescriptor> {
        self.ledger.page(id)
    }

    pub fn source(&self, id: FileId) -> Option<&Arc<SourceFile>> {
        self.ledger.file(id)
    }

    pub fn is_selected(&self, id: PageId) -> bool {
        self.selection.contains(id)
    }

    /// Selected ids in page order
    pub fn selected(&self) -> Vec<PageId> {
        self.ledger
            .pages()
            .iter()
            .map(|p| p.id)
            .filter(|id| self.selection.contains(*id))
            .collect()
    }

    pub fn selection_mode(&self) -> bool {
        self.selection.is_mode_active()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            pages: self.ledger.pages().to_vec(),
            selected: self.selected(),
            selection_mode: self.selection_mode(),
            page_count: self.ledger.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------

    /// Copy out what an export needs so it can run while the session keeps
    /// accepting edits.
    pub fn export_input(&self) -> AssemblyInput {
        AssemblyInput {
            pages: self.ledger.pages().to_vec(),
            files: self.ledger.files().clone(),
        }
    }

    pub async fn export(&self, options: &ExportOptions) -> Result<Assembled> {
        assemble(self.export_input(), options.clone()).await
    }
}
