use dashtable::export::ExportScope;
use dashtable::filter::FilterCriteria;
use dashtable::paginate::PageTarget;
use dashtable::selection::SelectAllState;
use dashtable::sort::SortField;
use dashtable::{Effect, Message, RecordId, RecordStore, Role, Status, TableConfig, TableController};

fn seeded() -> TableController {
    TableController::new(&TableConfig::default(), RecordStore::demo())
}

fn visible(table: &TableController) -> Vec<u32> {
    table.render().rows.iter().map(|r| r.record.id.0).collect()
}

#[test]
fn selection_survives_search_changes() {
    let mut table = seeded();
    table.update(Message::PageChanged(PageTarget::Next));
    table.update(Message::RowSelectionToggled(RecordId(14), true));

    table.update(Message::SearchChanged("jane".into()));
    assert_eq!(visible(&table), vec![2]);
    assert!(table.selection().contains(RecordId(14)));
    assert_eq!(table.render().selection.selected, 1);
    assert!(table.render().show_bulk_actions);
    assert_eq!(table.render().selection.select_all, SelectAllState::Unchecked);

    table.update(Message::SearchChanged(String::new()));
    table.update(Message::PageChanged(PageTarget::Last));
    let laura = table
        .render()
        .rows
        .iter()
        .find(|r| r.record.id == RecordId(14))
        .expect("record 14 is on the last page");
    assert!(laura.selected);
}

#[test]
fn deleting_a_selected_record_clears_it_from_the_selection() {
    let mut table = seeded();
    table.update(Message::RowSelectionToggled(RecordId(6), true));
    table.update(Message::RecordDeleted(RecordId(6)));
    assert!(table.store().get(RecordId(6)).is_none());
    assert!(!table.selection().contains(RecordId(6)));

    table.update(Message::RowSelectionToggled(RecordId(7), true));
    table.update(Message::BulkDeleteRequested(true));
    assert!(table.store().get(RecordId(7)).is_none());
    assert!(!table.selection().contains(RecordId(7)));
}

#[test]
fn select_all_on_page_two_only_touches_page_two() {
    let mut table = seeded();
    table.update(Message::RowSelectionToggled(RecordId(4), true));
    table.update(Message::PageChanged(PageTarget::Number(2)));
    let page_two: Vec<RecordId> = table.render().visible_ids();
    assert_eq!(page_two.len(), 10);

    table.update(Message::SelectAllToggled(true));
    assert_eq!(table.selection().size(), 11);
    assert!(page_two.iter().all(|id| table.selection().contains(*id)));
    assert_eq!(table.render().selection.select_all, SelectAllState::Checked);

    table.update(Message::SelectAllToggled(false));
    assert_eq!(table.selection().size(), 1);
    assert!(table.selection().contains(RecordId(4)));

    table.update(Message::PageChanged(PageTarget::First));
    assert_eq!(table.render().selection.select_all, SelectAllState::Indeterminate);
}

#[test]
fn select_all_on_a_short_last_page() {
    let mut table = seeded();
    let active = FilterCriteria::default().with_statuses([Status::Active].into_iter().collect());
    table.update(Message::FiltersApplied(active));
    assert_eq!(table.render().page.total_items, 14);
    table.update(Message::PageChanged(PageTarget::Last));
    assert_eq!(table.render().rows.len(), 4);
    table.update(Message::SelectAllToggled(true));
    assert_eq!(table.selection().size(), 4);
    assert_eq!(table.render().selection.select_all, SelectAllState::Checked);
}

#[test]
fn revenue_descending_first_page() {
    let mut table = seeded();
    table.update(Message::SortClicked(SortField::Revenue));
    table.update(Message::SortClicked(SortField::Revenue));

    assert_eq!(visible(&table), vec![14, 7, 18, 5, 15, 3, 11, 20, 1, 13]);
    let revenues: Vec<f64> = table.render().rows.iter().map(|r| r.record.revenue).collect();
    assert!(revenues.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(table.render().page.range_label(), "1-10 of 20");
}

#[test]
fn admin_filter_resets_page_and_sets_badge() {
    let mut table = seeded();
    table.update(Message::PageChanged(PageTarget::Next));
    assert_eq!(table.page_state().page, 2);

    let criteria = FilterCriteria::default().with_roles([Role::Admin].into_iter().collect());
    table.update(Message::FiltersApplied(criteria));

    let render = table.render();
    assert_eq!(render.page.total_items, 5);
    assert!(render.rows.iter().all(|r| r.record.role == Role::Admin));
    assert_eq!(render.filter_badge, 1);
    assert_eq!(table.page_state().page, 1);

    table.update(Message::FiltersCleared);
    assert_eq!(table.render().filter_badge, 0);
    assert_eq!(table.render().page.total_items, 20);
}

#[test]
fn bulk_delete_across_pages() {
    let mut table = seeded();
    table.update(Message::RowSelectionToggled(RecordId(4), true));
    table.update(Message::RowSelectionToggled(RecordId(3), true));
    table.update(Message::PageChanged(PageTarget::Next));
    table.update(Message::RowSelectionToggled(RecordId(20), true));

    assert_eq!(table.delete_selected(), 3);
    assert_eq!(table.store().len(), 17);
    assert!(table.selection().is_empty());
    assert!(!table.render().show_bulk_actions);
    assert_eq!(table.page_state().page, 2);
    assert_eq!(table.render().page.range_label(), "11-17 of 17");

    let notified = table
        .drain_effects()
        .into_iter()
        .any(|e| matches!(e, Effect::Notify(n) if n.message == "Deleted 3 records"));
    assert!(notified);
}

#[test]
fn bulk_delete_that_empties_the_current_page() {
    let mut table = seeded();
    table.update(Message::RowSelectionToggled(RecordId(4), true));
    table.update(Message::PageChanged(PageTarget::Last));
    table.update(Message::SelectAllToggled(true));
    table.update(Message::BulkDeleteRequested(true));

    assert_eq!(table.store().len(), 9);
    assert!(table.selection().is_empty());
    assert_eq!(table.page_state().page, 1);
    assert_eq!(table.render().page.total_pages, 1);
    assert_eq!(table.render().page.range_label(), "1-9 of 9");
}

#[test]
fn export_selection_covers_hidden_records() {
    let mut table = seeded();
    table.update(Message::RowSelectionToggled(RecordId(2), true));
    table.update(Message::RowSelectionToggled(RecordId(19), true));
    table.update(Message::SearchChanged("nobody matches this".into()));
    assert!(table.render().rows.is_empty());

    table.update(Message::BulkExportRequested(ExportScope::Selection));
    let payload = table
        .drain_effects()
        .into_iter()
        .find_map(|e| match e {
            Effect::Download(payload) => Some(payload),
            Effect::Notify(_) => None,
        })
        .expect("selection export produced a file");
    let lines: Vec<&str> = payload.content.lines().collect();
    assert_eq!(lines[0], "Name,Email,Role,Status,Last Login,Revenue");
    assert_eq!(lines[1], "Jane Smith,jane@example.com,User,Active,2024-01-14,8900");
    assert_eq!(lines[2], "Quentin Baker,quentin@example.com,User,Inactive,2024-01-05,1900");
}
