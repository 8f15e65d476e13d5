use std::time::Instant;

use tracing::{debug, trace};

use crate::bulk;
use crate::domain::{Effect, Message, Notification, Severity, TableConfig};
use crate::export::ExportScope;
use crate::filter::{self, FilterCriteria};
use crate::paginate::{self, PageInfo, PageState, PageTarget};
use crate::record::{NewRecord, Record, RecordId, RecordPatch};
use crate::selection::{SelectAllState, SelectionTracker};
use crate::sort::{self, SortDirection, SortField, SortSpec};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Unsorted,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub record: Record,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionSummary {
    pub selected: usize,
    pub select_all: SelectAllState,
}

/// Everything the presentation layer needs to draw the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInstruction {
    pub rows: Vec<RowView>,
    pub page: PageInfo,
    pub sort: Vec<(SortField, SortIndicator)>,
    pub selection: SelectionSummary,
    pub show_bulk_actions: bool,
    pub filter_badge: usize,
    pub criteria: FilterCriteria,
    pub search_term: String,
    /// Records in the store, for "Showing X of Y".
    pub store_len: usize,
}

impl RenderInstruction {
    fn empty() -> Self {
        RenderInstruction {
            rows: Vec::new(),
            page: PageInfo::default(),
            sort: Vec::new(),
            selection: SelectionSummary::default(),
            show_bulk_actions: false,
            filter_badge: 0,
            criteria: FilterCriteria::default(),
            search_term: String::new(),
            store_len: 0,
        }
    }

    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.rows.iter().map(|row| row.record.id).collect()
    }

    /// Text such as `Showing 8 of 20 results`.
    pub fn result_info(&self) -> String {
        format!("Showing {} of {} results", self.page.total_items, self.store_len)
    }
}

/// Owns the record store and all view state (search term, filter criteria,
/// sort, page and selection) and keeps them consistent after every intent.
pub struct TableController {
    config: TableConfig,
    store: RecordStore,
    search_term: String,
    criteria: FilterCriteria,
    sort: SortSpec,
    page: PageState,
    selection: SelectionTracker,
    /// Ids of the filtered result in display order.
    view: Vec<RecordId>,
    render: RenderInstruction,
    effects: Vec<Effect>,
}

impl TableController {
    pub fn new(config: &TableConfig, store: RecordStore) -> Self {
        let page_size = config.clamp_page_size(config.default_page_size);
        let mut controller = Self {
            config: config.clone(),
            store,
            search_term: String::new(),
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            page: PageState::new(page_size),
            selection: SelectionTracker::new(),
            view: Vec::new(),
            render: RenderInstruction::empty(),
            effects: Vec::new(),
        };
        controller.recompute();
        controller
    }

    pub fn update(&mut self, message: Message) {
        trace!("Update: {:?}", message);
        match message {
            Message::SearchChanged(term) => self.search_changed(term),
            Message::SortClicked(field) => self.sort_clicked(field),
            Message::FiltersApplied(criteria) => self.filters_applied(criteria),
            Message::FiltersCleared => self.filters_applied(FilterCriteria::default()),
            Message::PageSizeChanged(size) => self.page_size_changed(size),
            Message::PageChanged(target) => self.page_changed(target),
            Message::RowSelectionToggled(id, checked) => {
                self.selection.toggle(id, checked);
                self.refresh_selection();
            }
            Message::SelectAllToggled(checked) => {
                let visible = self.render.visible_ids();
                self.selection.select_page(&visible, checked);
                self.refresh_selection();
            }
            Message::SelectionCleared => {
                self.selection.clear();
                self.refresh_selection();
            }
            Message::BulkExportRequested(scope) => self.export(scope),
            Message::BulkStatusToggleRequested => self.toggle_selected_status(),
            Message::BulkDeleteRequested(confirmed) => {
                if confirmed {
                    self.delete_selected();
                } else {
                    debug!("Delete not confirmed, nothing to do");
                }
            }
            Message::RecordAdded(record) => self.add_record(record),
            Message::RecordUpdated(id, patch) => self.update_record(id, &patch),
            Message::RecordDeleted(id) => self.delete_record(id),
        }
    }

    pub fn render(&self) -> &RenderInstruction {
        &self.render
    }

    /// Takes the queued notifications and downloads.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Deletes every selected record. Confirmation is the caller's business.
    /// Returns how many records were removed.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            self.notify("No records selected", Severity::Warning);
            return 0;
        }
        let removed = bulk::delete_selected(&mut self.store, &mut self.selection);
        let remaining = filter::filter(self.store.records(), &self.search_term, &self.criteria).len();
        if self.page.page > paginate::total_pages(remaining, self.page.page_size) {
            debug!("Page {} is empty after delete, back to page 1", self.page.page);
            self.page.reset();
        }
        self.recompute();
        self.notify(format!("Deleted {removed} records"), Severity::Success);
        removed
    }

    fn search_changed(&mut self, term: String) {
        debug!("Search term: \"{term}\"");
        self.search_term = term;
        self.page.reset();
        self.recompute();
    }

    fn sort_clicked(&mut self, field: SortField) {
        self.sort.toggle(field);
        debug!("Sort by {} {:?}", self.sort.field, self.sort.direction);
        self.recompute();
    }

    fn filters_applied(&mut self, criteria: FilterCriteria) {
        debug!("Filters: {:?}", criteria);
        self.criteria = criteria;
        self.page.reset();
        self.recompute();
    }

    fn page_size_changed(&mut self, requested: usize) {
        self.page.page_size = self.config.clamp_page_size(requested);
        debug!("Page size {} (requested {requested})", self.page.page_size);
        self.page.reset();
        self.recompute();
    }

    fn page_changed(&mut self, target: PageTarget) {
        self.page.target(target, self.render.page.total_pages);
        self.recompute();
    }

    fn export(&mut self, scope: ExportScope) {
        let payload = match scope {
            ExportScope::Selection => bulk::export_selection(&self.store, &self.selection),
            ExportScope::All => {
                let ordered: Vec<&Record> =
                    self.view.iter().filter_map(|&id| self.store.get(id)).collect();
                Some(bulk::export_all(&ordered))
            }
        };
        // Success is reported by whoever delivers the file
        match payload {
            Some(payload) => self.effects.push(Effect::Download(payload)),
            None => self.notify("No records selected", Severity::Warning),
        }
    }

    fn toggle_selected_status(&mut self) {
        if self.selection.is_empty() {
            self.notify("No records selected", Severity::Warning);
            return;
        }
        let changed = bulk::toggle_status(&mut self.store, &self.selection);
        self.recompute();
        self.notify(format!("Updated status of {changed} records"), Severity::Success);
    }

    fn add_record(&mut self, record: NewRecord) {
        let name = record.name.clone();
        match self.store.insert(record) {
            Some(id) => {
                self.recompute();
                self.notify(format!("Added record {id}"), Severity::Success);
            }
            None => self.notify(format!("Could not add \"{name}\""), Severity::Warning),
        }
    }

    fn update_record(&mut self, id: RecordId, patch: &RecordPatch) {
        if self.store.update(id, patch) {
            self.recompute();
        } else {
            self.notify(format!("Record {id} does not exist"), Severity::Warning);
        }
    }

    fn delete_record(&mut self, id: RecordId) {
        if self.store.delete(id).is_none() {
            self.notify(format!("Record {id} does not exist"), Severity::Warning);
            return;
        }
        self.selection.prune(self.store.ids());
        self.recompute();
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.effects.push(Effect::Notify(Notification {
            message: message.into(),
            severity,
            duration: self.config.notification_duration,
        }));
    }

    /// Filter, sort and paginate from the full store, then rebuild the render instruction.
    fn recompute(&mut self) {
        let start_time = Instant::now();

        let filtered = filter::filter(self.store.records(), &self.search_term, &self.criteria);
        let ordered = sort::sort(&filtered, self.sort);
        self.view = ordered.iter().map(|r| r.id).collect();

        self.page
            .clamp(paginate::total_pages(ordered.len(), self.page.page_size));
        let page = paginate::paginate(&ordered, &self.page);

        let rows: Vec<RowView> = page
            .rows
            .iter()
            .map(|record| RowView {
                record: (*record).clone(),
                selected: self.selection.contains(record.id),
            })
            .collect();

        let sort_indicators = SortField::ALL
            .iter()
            .map(|&field| {
                let indicator = if field != self.sort.field {
                    SortIndicator::Unsorted
                } else if self.sort.direction == SortDirection::Ascending {
                    SortIndicator::Ascending
                } else {
                    SortIndicator::Descending
                };
                (field, indicator)
            })
            .collect();

        self.render = RenderInstruction {
            rows,
            page: page.info,
            sort: sort_indicators,
            selection: SelectionSummary::default(),
            show_bulk_actions: false,
            filter_badge: self.criteria.active_count(),
            criteria: self.criteria.clone(),
            search_term: self.search_term.clone(),
            store_len: self.store.len(),
        };
        self.refresh_selection();

        trace!(
            "Recompute: {} of {} records, page {}/{}, took {}ms",
            self.render.page.total_items,
            self.store.len(),
            self.render.page.current_page,
            self.render.page.total_pages,
            start_time.elapsed().as_millis()
        );
    }

    /// Selection changes only touch the checkboxes and the summary.
    fn refresh_selection(&mut self) {
        for row in self.render.rows.iter_mut() {
            row.selected = self.selection.contains(row.record.id);
        }
        let visible = self.render.visible_ids();
        self.render.selection = SelectionSummary {
            selected: self.selection.size(),
            select_all: self.selection.select_all_state(&visible),
        };
        self.render.show_bulk_actions = self.selection.size() > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Role, Status};

    fn controller() -> TableController {
        TableController::new(&TableConfig::default(), RecordStore::demo())
    }

    fn visible(controller: &TableController) -> Vec<u32> {
        controller.render().rows.iter().map(|r| r.record.id.0).collect()
    }

    #[test]
    fn initial_view_is_first_page_sorted_by_name() {
        let controller = controller();
        let render = controller.render();
        assert_eq!(visible(&controller), vec![4, 3, 5, 6, 7, 8, 9, 10, 11, 2]);
        assert_eq!(render.page.range_label(), "1-10 of 20");
        assert_eq!(render.result_info(), "Showing 20 of 20 results");
        assert!(!render.show_bulk_actions);
        assert_eq!(render.sort[0], (SortField::Name, SortIndicator::Ascending));
        assert_eq!(render.sort[5], (SortField::Revenue, SortIndicator::Unsorted));
    }

    #[test]
    fn search_resets_page() {
        let mut controller = controller();
        controller.update(Message::PageChanged(PageTarget::Next));
        assert_eq!(controller.page_state().page, 2);
        controller.update(Message::SearchChanged("example".into()));
        assert_eq!(controller.page_state().page, 1);
        controller.update(Message::SearchChanged("ADMIN".into()));
        assert_eq!(visible(&controller), vec![5, 9, 1, 14, 20]);
        assert_eq!(controller.render().result_info(), "Showing 5 of 20 results");
    }

    #[test]
    fn sorting_keeps_page_but_flips_direction() {
        let mut controller = controller();
        controller.update(Message::PageChanged(PageTarget::Last));
        controller.update(Message::SortClicked(SortField::Name));
        assert_eq!(controller.page_state().page, 2);
        assert_eq!(controller.sort_spec().direction, SortDirection::Descending);
        assert_eq!(visible(&controller), vec![2, 11, 10, 9, 8, 7, 6, 5, 3, 4]);
        assert_eq!(controller.render().sort[0], (SortField::Name, SortIndicator::Descending));
    }

    #[test]
    fn page_size_is_clamped_and_resets_page() {
        let mut controller = controller();
        controller.update(Message::PageChanged(PageTarget::Next));
        controller.update(Message::PageSizeChanged(30));
        assert_eq!(controller.page_state(), PageState { page: 1, page_size: 25 });
        assert_eq!(controller.render().rows.len(), 20);
        assert_eq!(controller.render().page.total_pages, 1);
    }

    #[test]
    fn page_navigation_is_clamped() {
        let mut controller = controller();
        controller.update(Message::PageChanged(PageTarget::Number(9)));
        assert_eq!(controller.page_state().page, 2);
        controller.update(Message::PageChanged(PageTarget::Previous));
        controller.update(Message::PageChanged(PageTarget::Previous));
        assert_eq!(controller.page_state().page, 1);
    }

    #[test]
    fn row_toggle_updates_summary_and_bulk_bar() {
        let mut controller = controller();
        controller.update(Message::RowSelectionToggled(RecordId(4), true));
        let render = controller.render();
        assert!(render.rows[0].selected);
        assert_eq!(render.selection.selected, 1);
        assert_eq!(render.selection.select_all, SelectAllState::Indeterminate);
        assert!(render.show_bulk_actions);

        controller.update(Message::SelectAllToggled(true));
        assert_eq!(controller.render().selection.select_all, SelectAllState::Checked);
        controller.update(Message::SelectionCleared);
        assert!(!controller.render().show_bulk_actions);
    }

    #[test]
    fn unconfirmed_delete_does_nothing() {
        let mut controller = controller();
        controller.update(Message::RowSelectionToggled(RecordId(1), true));
        controller.update(Message::BulkDeleteRequested(false));
        assert_eq!(controller.store().len(), 20);
        assert!(controller.selection().contains(RecordId(1)));
        assert!(controller.drain_effects().is_empty());
    }

    #[test]
    fn empty_selection_bulk_ops_warn_only() {
        let mut controller = controller();
        controller.update(Message::BulkExportRequested(ExportScope::Selection));
        controller.update(Message::BulkStatusToggleRequested);
        assert_eq!(controller.delete_selected(), 0);
        let effects = controller.drain_effects();
        assert_eq!(effects.len(), 3);
        assert!(effects.iter().all(|e| matches!(
            e,
            Effect::Notify(Notification { severity: Severity::Warning, .. })
        )));
        assert_eq!(controller.store().len(), 20);
    }

    #[test]
    fn export_all_follows_current_sort_and_filter() {
        let mut controller = controller();
        controller.update(Message::FiltersApplied(
            FilterCriteria::default().with_statuses([Status::Inactive].into_iter().collect()),
        ));
        controller.update(Message::SortClicked(SortField::Revenue));
        controller.update(Message::BulkExportRequested(ExportScope::All));
        let download = controller.drain_effects().into_iter().find_map(|e| match e {
            Effect::Download(payload) => Some(payload),
            Effect::Notify(_) => None,
        });
        let payload = download.expect("export produced a file");
        assert_eq!(payload.filename, "table-data.csv");
        assert_eq!(payload.records, 6);
        let names: Vec<&str> = payload
            .content
            .lines()
            .skip(1)
            .filter_map(|l| l.split(',').next())
            .collect();
        assert_eq!(
            names,
            vec!["Quentin Baker", "Julia Allen", "Diana Davis", "George Lewis", "Bob Johnson", "Michael Wright"]
        );
    }

    #[test]
    fn export_queues_only_the_download() {
        let mut controller = controller();
        controller.update(Message::BulkExportRequested(ExportScope::All));
        let effects = controller.drain_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(&effects[0], Effect::Download(payload) if payload.records == 20));
    }

    #[test]
    fn adding_a_record_with_negative_revenue_is_refused() {
        let mut controller = controller();
        controller.update(Message::RecordAdded(NewRecord {
            name: "Minus".into(),
            email: "minus@example.com".into(),
            role: Role::User,
            status: Status::Active,
            last_login: "2024-02-01".into(),
            revenue: -500.0,
        }));
        assert_eq!(controller.store().len(), 20);
        assert!(controller.store().records().iter().all(|r| r.revenue >= 0.0));
        let effects = controller.drain_effects();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Notify(Notification { severity: Severity::Warning, .. })]
        ));
    }

    #[test]
    fn status_toggle_reaches_hidden_selected_records() {
        let mut controller = controller();
        controller.update(Message::RowSelectionToggled(RecordId(1), true));
        controller.update(Message::SearchChanged("jane".into()));
        controller.update(Message::BulkStatusToggleRequested);
        assert_eq!(
            controller.store().get(RecordId(1)).map(|r| r.status),
            Some(Status::Inactive)
        );
    }

    #[test]
    fn record_crud_keeps_selection_consistent() {
        let mut controller = controller();
        controller.update(Message::RecordAdded(NewRecord {
            name: "Aaron Ash".into(),
            email: "aaron@example.com".into(),
            role: Role::Manager,
            status: Status::Active,
            last_login: "2024-02-01".into(),
            revenue: 500.0,
        }));
        assert_eq!(controller.store().len(), 21);
        assert_eq!(visible(&controller)[0], 21);

        controller.update(Message::RecordUpdated(
            RecordId(21),
            RecordPatch::default().name("Zoe Ash"),
        ));
        assert_ne!(visible(&controller)[0], 21);

        controller.update(Message::RowSelectionToggled(RecordId(21), true));
        controller.update(Message::RecordDeleted(RecordId(21)));
        assert!(!controller.selection().contains(RecordId(21)));
        assert_eq!(controller.render().selection.selected, 0);
    }
}
