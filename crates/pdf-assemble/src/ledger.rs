//! Page ledger: the ordered pages of the output document and the source
//! files they reference.
//!
//! Mutations here never touch history; the session snapshots before calling
//! them.

use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Immutable copy of the page sequence, used for undo/redo.
/// Source files are append-only and are not part of a snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pages: Vec<PageDescriptor>,
}

impl Snapshot {
    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pages: Vec<PageDescriptor>,
    files: HashMap<FileId, Arc<SourceFile>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, id: PageId) -> Option<&PageDescriptor> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    pub fn contains(&self, id: PageId) -> bool {
        self.index_of(id).is_some()
    }

    /// Page ids in output order
    pub fn ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|p| p.id).collect()
    }

    pub fn files(&self) -> &HashMap<FileId, Arc<SourceFile>> {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&Arc<SourceFile>> {
        self.files.get(&id)
    }

    /// Register a materialized file and add its pages after the existing ones.
    pub fn append(&mut self, pages: Vec<PageDescriptor>, file: SourceFile) {
        debug_assert!(pages.iter().all(|p| p.source_file == file.id));
        debug_assert!(pages.iter().all(|p| !self.contains(p.id)));

        self.files.insert(file.id, Arc::new(file));
        self.pages.extend(pages);
    }

    /// Move the page at `from` to `to`, shifting the pages in between.
    /// Returns false (and does nothing) for equal or out-of-range indices.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.pages.len();
        if from == to || from >= len || to >= len {
            return false;
        }

        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        true
    }

    /// Turn one page a quarter turn clockwise
    pub fn rotate(&mut self, id: PageId) -> bool {
        match self.pages.iter_mut().find(|p| p.id == id) {
            Some(page) => {
                page.rotation = page.rotation.turned();
                true
            }
            None => false,
        }
    }

    /// Turn every listed page a quarter turn clockwise; returns how many turned
    pub fn rotate_many(&mut self, ids: &HashSet<PageId>) -> usize {
        let mut turned = 0;
        for page in self.pages.iter_mut().filter(|p| ids.contains(&p.id)) {
            page.rotation = page.rotation.turned();
            turned += 1;
        }
        turned
    }

    /// Remove every listed page, keeping survivors in order; returns how many went
    pub fn remove(&mut self, ids: &HashSet<PageId>) -> usize {
        let before = self.pages.len();
        self.pages.retain(|p| !ids.contains(&p.id));
        before - self.pages.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pages: self.pages.clone(),
        }
    }

    /// Replace the page sequence. Pages whose file is unknown are dropped so
    /// the ledger never holds a dangling reference.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let files = &self.files;
        self.pages = snapshot
            .pages
            .into_iter()
            .filter(|p| files.contains_key(&p.source_file))
            .collect();
    }
}
