//! Multi-selection over ledger pages

use crate::types::PageId;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: HashSet<PageId>,
    /// Selection mode entered explicitly, even with nothing selected yet
    explicit_mode: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain click: select only `id`, or deselect it if it was the sole
    /// selection. Additive click: flip `id` and leave the rest alone.
    pub fn toggle(&mut self, id: PageId, additive: bool) {
        if additive {
            if !self.ids.remove(&id) {
                self.ids.insert(id);
            }
            return;
        }

        let sole_selected = self.ids.len() == 1 && self.ids.contains(&id);
        self.ids.clear();
        if !sole_selected {
            self.ids.insert(id);
        }
    }

    /// Select every page, or clear when every page is already selected
    pub fn select_all(&mut self, all: &[PageId]) {
        if self.ids.len() == all.len() {
            self.ids.clear();
        } else {
            self.ids = all.iter().copied().collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids that are still in the ledger
    pub fn prune(&mut self, surviving: &HashSet<PageId>) {
        self.ids.retain(|id| surviving.contains(id));
    }

    pub fn enter_mode(&mut self) {
        self.explicit_mode = true;
    }

    pub fn exit_mode(&mut self) {
        self.explicit_mode = false;
        self.ids.clear();
    }

    pub fn is_mode_active(&self) -> bool {
        self.explicit_mode || !self.ids.is_empty()
    }

    pub fn contains(&self, id: PageId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &HashSet<PageId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
