//! Bulk operations over the current selection. They act on every selected
//! record in the store, whatever the active filter or page. An empty
//! selection turns each of them into a no-op.

use tracing::info;

use crate::export::{ExportPayload, ExportScope};
use crate::record::Record;
use crate::selection::SelectionTracker;
use crate::store::RecordStore;

/// Selected records in store order, `None` when nothing is selected.
pub fn export_selection(store: &RecordStore, selection: &SelectionTracker) -> Option<ExportPayload> {
    if selection.is_empty() {
        return None;
    }
    let records = store.records().iter().filter(|r| selection.contains(r.id));
    let payload = ExportPayload::csv(ExportScope::Selection, records);
    info!("Exported {} selected records", payload.records);
    Some(payload)
}

/// The given records (the sorted, filtered result) in the order supplied.
pub fn export_all(ordered: &[&Record]) -> ExportPayload {
    let payload = ExportPayload::csv(ExportScope::All, ordered.iter().copied());
    info!("Exported {} records", payload.records);
    payload
}

/// Flips the status of every selected record. Returns how many changed.
pub fn toggle_status(store: &mut RecordStore, selection: &SelectionTracker) -> usize {
    let mut changed = 0;
    for record in store.records_mut().filter(|r| selection.contains(r.id)) {
        record.status = record.status.flipped();
        changed += 1;
    }
    if changed > 0 {
        info!("Toggled status of {changed} records");
    }
    changed
}

/// Removes every selected record and prunes the selection right away.
/// Returns how many records were removed.
pub fn delete_selected(store: &mut RecordStore, selection: &mut SelectionTracker) -> usize {
    if selection.is_empty() {
        return 0;
    }
    let removed = store.delete_ids(selection.ids());
    selection.prune(store.ids());
    info!("Deleted {removed} records, {} left", store.len());
    removed
}
