use std::collections::HashSet;

use tracing::trace;

use crate::record::RecordId;

/// State of the tri-state "select all" control for the visible page:
/// none, some or all of the visible ids are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectAllState {
    #[default]
    Unchecked,
    Indeterminate,
    Checked,
}

/// Session-wide set of selected record ids. Ids stay selected while they are
/// hidden by a filter or sit on another page.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selected: HashSet<RecordId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: RecordId, included: bool) {
        if included {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    /// Adds or removes exactly the given page ids, other selections are kept.
    pub fn select_page(&mut self, ids: &[RecordId], included: bool) {
        for &id in ids {
            self.toggle(id, included);
        }
        trace!("Page selection ({included}) over {} ids, {} selected", ids.len(), self.size());
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drops every selected id that is not in `existing`. Returns how many were dropped.
    pub fn prune(&mut self, existing: impl IntoIterator<Item = RecordId>) -> usize {
        let existing: HashSet<RecordId> = existing.into_iter().collect();
        let before = self.selected.len();
        self.selected.retain(|id| existing.contains(id));
        before - self.selected.len()
    }

    pub fn size(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.selected.contains(&id)
    }

    pub fn ids(&self) -> &HashSet<RecordId> {
        &self.selected
    }

    pub fn select_all_state(&self, visible: &[RecordId]) -> SelectAllState {
        let selected = visible.iter().filter(|id| self.contains(**id)).count();
        if selected == 0 {
            SelectAllState::Unchecked
        } else if selected == visible.len() {
            SelectAllState::Checked
        } else {
            SelectAllState::Indeterminate
        }
    }
}
